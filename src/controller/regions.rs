use super::crud::{CrudController, Resource};
use super::table::Column;
use crate::model::{RegionEntry, RegionForm};
use crate::session::PATH_REGIONS;

pub type RegionsController = CrudController<RegionEntry>;

impl Resource for RegionEntry {
    type Form = RegionForm;

    const NAME: &'static str = "regions";
    const BASE_PATH: &'static str = PATH_REGIONS;
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this Regions?";

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Name"),
            Column::new("regions", "Regions"),
            Column::numeric("price", "Price"),
            Column::numeric("weight_threshold", "Weight threshold in grams"),
            Column::numeric("price_per_g", "Price per gram"),
            Column::new("updated_at", "Updated At"),
            Column::new("id", "ID"),
        ]
    }

    fn form_id(form: &RegionForm) -> Option<&str> {
        form.id.as_deref().filter(|id| !id.is_empty())
    }
}
