use axum::Json;
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Auto Parts API is running",
        "endpoints": {
            "parts_inquiry": "/api/parts-inquiry/",
            "manufacturers": "/api/manufacturers/",
            "models": "/api/models/",
            "part_categories": "/api/part-categories/",
            "contact": "/api/contact/"
        }
    }))
}
