/// User-facing outcome of an action, shown as a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub destructive: bool,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            destructive: false,
        }
    }

    pub fn failure(description: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            description: description.into(),
            destructive: true,
        }
    }
}
