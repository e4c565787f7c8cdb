//! Screen selection state machine.

use serde::Serialize;
use std::fmt;

use crate::models::ProcurementRecord;

/// The four screens. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Entry,
    List,
    Summary,
    Settings,
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tab::Entry => write!(f, "entry"),
            Tab::List => write!(f, "list"),
            Tab::Summary => write!(f, "summary"),
            Tab::Settings => write!(f, "settings"),
        }
    }
}

/// User actions that move between screens.
#[derive(Debug, Clone)]
pub enum Action {
    /// Tab bar selection.
    Select(Tab),
    /// Open a record in the entry screen.
    Edit(Box<ProcurementRecord>),
    /// Abandon the entry screen.
    Cancel,
    /// The entry screen submitted a record.
    Complete { stay: bool },
}

/// What the header shows for the active screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub title: &'static str,
    pub subtitle: String,
    /// Current supplier, shown only on the entry screen.
    pub supplier_badge: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Router {
    active: Tab,
    editing: Option<ProcurementRecord>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    /// Record pre-seeding the entry screen, if an edit is in progress.
    pub fn editing(&self) -> Option<&ProcurementRecord> {
        self.editing.as_ref()
    }

    pub fn transition(&mut self, action: Action) -> Tab {
        match action {
            Action::Select(tab) => {
                self.active = tab;
            }
            Action::Edit(record) => {
                self.editing = Some(*record);
                self.active = Tab::Entry;
            }
            Action::Cancel => {
                self.editing = None;
                self.active = Tab::List;
            }
            Action::Complete { stay } => {
                self.editing = None;
                self.active = if stay { Tab::Entry } else { Tab::List };
            }
        }
        tracing::debug!("Active screen: {}", self.active);
        self.active
    }

    pub fn header(&self, supplier: &str) -> Header {
        let title = match self.active {
            Tab::Entry if self.editing.is_some() => "修改采购",
            Tab::Entry => "采购录入",
            Tab::List => "采购明细",
            Tab::Summary => "统计概览",
            Tab::Settings => "系统设定",
        };

        let supplier_badge = (self.active == Tab::Entry).then(|| match supplier.trim() {
            "" => "待录入".to_string(),
            name => name.to_string(),
        });

        Header {
            title,
            subtitle: format!("Procurement v{}", crate::version()),
            supplier_badge,
        }
    }
}
