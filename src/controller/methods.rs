use super::crud::{display_cell, CrudController, Resource};
use super::table::Column;
use crate::model::{MethodEntry, MethodForm};
use crate::session::PATH_METHODS;
use chrono::{DateTime, Utc};
use serde_json::json;

pub use super::format::method_regions_label;

pub type MethodsController = CrudController<MethodEntry>;

impl Resource for MethodEntry {
    type Form = MethodForm;

    const NAME: &'static str = "methods";
    const BASE_PATH: &'static str = PATH_METHODS;
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this Method?";

    fn columns() -> Vec<Column> {
        vec![
            Column::new("title", "Title"),
            Column::numeric("cost_percentage", "Cost %"),
            Column::new("regions", "Regions"),
            Column::new("updated_at", "Updated At"),
            Column::new("id", "ID"),
        ]
    }

    fn form_id(form: &MethodForm) -> Option<&str> {
        form.id.as_deref().filter(|id| !id.is_empty())
    }

    fn display_cell(&self, field: &str, now: DateTime<Utc>) -> String {
        match field {
            "regions" => method_regions_label(&json!(self.regions)),
            _ => display_cell(self, field, now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::notify::testing::{FixedConfirm, RecordingSink};
    use crate::session::testing::RecordingClient;
    use crate::session::HttpMethod;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn methods_use_their_own_endpoints() {
        let api = Arc::new(RecordingClient::new());
        let sink = Arc::new(RecordingSink::default());
        let ctl = MethodsController::new(api.clone(), sink.clone());
        api.on(HttpMethod::Post, PATH_METHODS, Ok(json!({"id": "m1"})));
        api.on(HttpMethod::Delete, PATH_METHODS, Ok(json!({"success": true})));
        api.on(
            HttpMethod::Get,
            "/shipping/api/v1/methods/paginated",
            Ok(json!({
                "data": [{"id": "m1", "title": "Express", "cost_percentage": 10.0, "regions": ["Europe", "Asia"]}],
                "total": 1
            })),
        );

        ctl.open_new();
        ctl.apply_field("title", "Express").unwrap().unwrap();
        ctl.apply_field("cost_percentage", "10").unwrap().unwrap();
        assert!(ctl.save().await);
        assert!(ctl.delete("m1", &FixedConfirm::new(true)).await);

        let calls = api.calls();
        assert_eq!(calls[0].path, "/shipping/api/v1/methods");
        assert_eq!(calls[0].body.as_ref().unwrap()["cost_percentage"], json!(10.0));
        assert!(calls[1].path.starts_with("/shipping/api/v1/methods/paginated?"));
        assert_eq!(calls[2].path, "/shipping/api/v1/methods/m1");
        assert_eq!(sink.error_count(), 0);

        let row = &ctl.rows()[0];
        assert_eq!(
            method_regions_label(&json!(row.regions)),
            "Europe, Asia"
        );
    }

    #[test]
    fn empty_id_counts_as_new() {
        let form = MethodForm {
            id: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(MethodEntry::form_id(&form), None);
    }

    #[test]
    fn table_cells_use_region_label_and_relative_time() {
        use chrono::TimeZone;
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let row = MethodEntry {
            id: "m1".into(),
            title: "Std".into(),
            cost_percentage: 12.5,
            regions: vec!["Europe".into(), "Asia".into()],
            updated_at: Some("2024-05-01T11:57:00".into()),
            ..Default::default()
        };
        assert_eq!(row.display_cell("regions", now), "Europe, Asia");
        assert_eq!(row.display_cell("updated_at", now), "3 分钟前");
        assert_eq!(row.display_cell("cost_percentage", now), "12.5");
    }
}
