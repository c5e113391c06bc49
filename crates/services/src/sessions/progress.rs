/// Aggregated view of lesson attempt progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}
