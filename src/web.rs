use crate::hansik::Hansik;
use serde::{Deserialize, Serialize};
use serde_with::{NoneAsEmptyString, serde_as};

pub mod api;

#[derive(Clone)]
pub struct ApiContext {
    pub hansik: Hansik,
}

#[serde_as]
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DayQuery {
    /// today, mon, tue, wed, thu or fri
    #[serde_as(as = "NoneAsEmptyString")]
    pub day: Option<String>,
}
