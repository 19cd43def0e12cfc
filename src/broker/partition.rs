use crate::record::Department;

/// One configured domain ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition {
    pub department: Department,
    pub id: String,
}

impl Partition {
    pub fn new(department: Department, id: impl Into<String>) -> Self {
        Self {
            department,
            id: id.into(),
        }
    }

    pub fn priority(&self) -> u8 {
        self.department.priority()
    }
}
