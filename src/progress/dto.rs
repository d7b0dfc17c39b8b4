use serde::{Deserialize, Serialize};

/// Volume of one exercise on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumePoint {
    pub date: String, // YYYY-MM-DD
    pub volume: f64,  // rounded to two decimals
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProgress {
    pub name: String,
    pub data: Vec<VolumePoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub exercises: Vec<ExerciseProgress>,
}
