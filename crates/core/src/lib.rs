#![forbid(unsafe_code)]

pub mod ids {
    /// Zero-based slot of a todo in list order.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct Position(u32);

    impl Position {
        pub const fn new(index: u32) -> Self {
            Self(index)
        }

        pub const fn index(self) -> u32 {
            self.0
        }

        pub fn as_i64(self) -> i64 {
            i64::from(self.0)
        }

        /// Converts the 1-based number a user sees into a position.
        pub fn from_display(number: u32) -> Result<Self, PositionError> {
            match number {
                0 => Err(PositionError::Zero),
                n => Ok(Self(n - 1)),
            }
        }

        pub fn try_from_i64(value: i64) -> Result<Self, PositionError> {
            if value < 0 {
                return Err(PositionError::Negative);
            }
            u32::try_from(value)
                .map(Self)
                .map_err(|_| PositionError::TooLarge)
        }
    }

    impl std::fmt::Display for Position {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum PositionError {
        Zero,
        Negative,
        TooLarge,
    }

    impl PositionError {
        pub fn message(&self) -> &'static str {
            match self {
                Self::Zero => "todo numbers start at 1",
                Self::Negative => "position must not be negative",
                Self::TooLarge => "position is too large",
            }
        }
    }

    impl std::fmt::Display for PositionError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.message())
        }
    }

    impl std::error::Error for PositionError {}
}

pub mod model {
    use crate::ids::Position;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
    pub enum TodoStatus {
        #[default]
        Pending,
        Completed,
    }

    impl TodoStatus {
        pub const fn as_i64(self) -> i64 {
            match self {
                Self::Pending => 1,
                Self::Completed => 2,
            }
        }

        pub fn from_i64(value: i64) -> Result<Self, TodoStatusError> {
            match value {
                1 => Ok(Self::Pending),
                2 => Ok(Self::Completed),
                other => Err(TodoStatusError::Unknown(other)),
            }
        }

        pub const fn is_completed(self) -> bool {
            matches!(self, Self::Completed)
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum TodoStatusError {
        Unknown(i64),
    }

    impl TodoStatusError {
        pub fn message(&self) -> &'static str {
            match self {
                Self::Unknown(_) => "unknown todo status",
            }
        }
    }

    impl std::fmt::Display for TodoStatusError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::Unknown(value) => write!(f, "{} ({value})", self.message()),
            }
        }
    }

    impl std::error::Error for TodoStatusError {}

    #[derive(Clone, Debug, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Todo {
        pub task: String,
        pub category: String,
        pub date_added: String,
        pub date_completed: Option<String>,
        pub status: TodoStatus,
        pub position: Position,
    }

    impl Todo {
        pub fn is_completed(&self) -> bool {
            self.status.is_completed()
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct NewTodo {
        pub task: String,
        pub category: String,
        pub date_added: String,
        pub status: TodoStatus,
    }

    impl NewTodo {
        pub fn pending(
            task: impl Into<String>,
            category: impl Into<String>,
            date_added: impl Into<String>,
        ) -> Self {
            Self {
                task: task.into(),
                category: category.into(),
                date_added: date_added.into(),
                status: TodoStatus::Pending,
            }
        }
    }

    /// Fields to overwrite on an existing todo. `None` leaves the field as is.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct TodoPatch {
        pub task: Option<String>,
        pub category: Option<String>,
    }

    impl TodoPatch {
        pub fn task(value: impl Into<String>) -> Self {
            Self {
                task: Some(value.into()),
                category: None,
            }
        }

        pub fn category(value: impl Into<String>) -> Self {
            Self {
                task: None,
                category: Some(value.into()),
            }
        }

        pub fn is_empty(&self) -> bool {
            self.task.is_none() && self.category.is_none()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ids::{Position, PositionError};
    use super::model::{NewTodo, TodoPatch, TodoStatus, TodoStatusError};

    #[test]
    fn display_numbers_are_one_based() {
        assert_eq!(Position::from_display(1), Ok(Position::new(0)));
        assert_eq!(Position::from_display(7), Ok(Position::new(6)));
        assert_eq!(Position::from_display(0), Err(PositionError::Zero));
    }

    #[test]
    fn positions_reject_out_of_range_storage_values() {
        assert_eq!(Position::try_from_i64(3), Ok(Position::new(3)));
        assert_eq!(Position::try_from_i64(-1), Err(PositionError::Negative));
        assert_eq!(
            Position::try_from_i64(i64::from(u32::MAX) + 1),
            Err(PositionError::TooLarge)
        );
    }

    #[test]
    fn status_maps_to_stored_integers() {
        assert_eq!(TodoStatus::Pending.as_i64(), 1);
        assert_eq!(TodoStatus::Completed.as_i64(), 2);
        assert_eq!(TodoStatus::from_i64(2), Ok(TodoStatus::Completed));
        assert_eq!(TodoStatus::from_i64(3), Err(TodoStatusError::Unknown(3)));
        assert_eq!(TodoStatus::default(), TodoStatus::Pending);
    }

    #[test]
    fn new_todos_start_pending() {
        let todo = NewTodo::pending("Buy milk", "Errand", "2024-01-01T00:00:00Z");
        assert_eq!(todo.status, TodoStatus::Pending);
        assert_eq!(todo.task, "Buy milk");
    }

    #[test]
    fn patch_constructors_touch_one_field() {
        assert!(TodoPatch::default().is_empty());
        let patch = TodoPatch::task("Read");
        assert_eq!(patch.task.as_deref(), Some("Read"));
        assert!(patch.category.is_none());
        let patch = TodoPatch::category("Learn");
        assert!(patch.task.is_none());
        assert!(!patch.is_empty());
    }
}
