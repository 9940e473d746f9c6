//! Session Query Pipeline.

use matrixpert_core::error::CoreError;
use matrixpert_core::history::{PendingRecord, QueryRecord};
use matrixpert_core::raster::encode_png_base64;
use matrixpert_core::selection::ImageSelection;
use matrixpert_core::session::SessionContext;
use matrixpert_inference::multimodal::MultimodalModel;

use crate::error::PipelineError;

/// Records appended by one successful run.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub appended: Vec<QueryRecord>,
}

/// Run `query` against the selected image(s) of `session`.
///
/// Every selected image is encoded as base64 PNG and sent with the exact
/// query text, one call per image, in order. Records are appended only after
/// all calls succeed; on any failure the history is left as it was.
pub async fn run_query(
    session: &mut SessionContext,
    model: &dyn MultimodalModel,
    query: &str,
    selection: ImageSelection,
) -> Result<QueryOutcome, PipelineError> {
    if query.trim().is_empty() {
        return Err(CoreError::Validation("Query must not be empty".into()).into());
    }

    // Encode up front so no borrow of the session outlives the network calls.
    let payloads = selection
        .resolve(session)?
        .into_iter()
        .map(|selected| {
            encode_png_base64(selected.raster)
                .map(|b64| (selected.index, selected.used_crop, b64))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut pending = Vec::with_capacity(payloads.len());
    for (image_index, used_crop, payload) in payloads {
        tracing::info!(
            session_id = %session.id(),
            image_index,
            used_crop,
            "Submitting query to multimodal model"
        );

        let response = model.submit(&payload, query).await.map_err(|e| {
            tracing::warn!(
                session_id = %session.id(),
                image_index,
                error = %e,
                "Multimodal query failed, history unchanged"
            );
            e
        })?;

        pending.push(PendingRecord {
            query: query.to_string(),
            response,
            image_index,
            used_crop,
        });
    }

    let start = session.history().len();
    session.history_mut().extend(pending);
    session.touch();

    let appended = session.history().records()[start..].to_vec();
    tracing::info!(
        session_id = %session.id(),
        appended = appended.len(),
        history_len = session.history().len(),
        "Query answered"
    );

    Ok(QueryOutcome { appended })
}
