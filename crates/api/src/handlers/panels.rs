//! Static content for the navigation panels.

use axum::Json;
use matrixpert_core::panels::{info_content, InfoContent, PanelDescriptor, PANELS};

use crate::response::DataResponse;

/// GET /api/v1/panels
pub async fn list_panels() -> Json<DataResponse<Vec<PanelDescriptor>>> {
    let data = PANELS.iter().map(|p| p.descriptor()).collect();
    Json(DataResponse { data })
}

/// GET /api/v1/panels/info
pub async fn get_info() -> Json<DataResponse<InfoContent>> {
    Json(DataResponse {
        data: info_content(),
    })
}
