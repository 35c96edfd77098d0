#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgKind {
    /// Expects the next command line argument as its value.
    Value { is_mandatory: bool },
    Flag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgDef {
    pub name: String,
    pub alias: char,
    pub description: String,
    pub kind: ArgKind,
}

impl ArgDef {
    pub fn value(name: &str, alias: char, description: &str, is_mandatory: bool) -> Self {
        Self {
            name: name.to_string(),
            alias,
            description: description.to_string(),
            kind: ArgKind::Value { is_mandatory },
        }
    }

    pub fn flag(name: &str, alias: char, description: &str) -> Self {
        Self {
            name: name.to_string(),
            alias,
            description: description.to_string(),
            kind: ArgKind::Flag,
        }
    }

    pub fn is_flag(&self) -> bool {
        self.kind == ArgKind::Flag
    }

    pub fn is_mandatory(&self) -> bool {
        matches!(self.kind, ArgKind::Value { is_mandatory: true })
    }
}
