use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::storage::{KeyValueStore, StorageResult};

/// Storage key for the whole ordered pin collection. The collection
/// always round-trips as one document; there is no per-pin key.
pub const PINS_STORAGE_KEY: &str = "tcu_stweb_pins";
/// Storage key for the floating launcher position.
pub const LAUNCHER_POS_STORAGE_KEY: &str = "tcu_stweb_fab_pos";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinKind {
    Link,
    Group,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupItem {
    pub name: String,
    pub href: String,
}

/// A persisted shortcut. `href` is the identity across the collection;
/// group pins without a real link carry a synthetic `group:<name>` one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    pub name: String,
    pub href: String,
    #[serde(rename = "type")]
    pub kind: PinKind,
    #[serde(default)]
    pub items: Vec<GroupItem>,
}

impl Pin {
    pub fn link(name: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            href: href.into(),
            kind: PinKind::Link,
            items: Vec::new(),
        }
    }

    pub fn group(
        name: impl Into<String>,
        href: impl Into<String>,
        items: Vec<GroupItem>,
    ) -> Self {
        Self {
            name: name.into(),
            href: href.into(),
            kind: PinKind::Group,
            items,
        }
    }

    pub fn synthetic_group_href(name: &str) -> String {
        format!("group:{name}")
    }
}

/// Persisted launcher placement, CSS pixel strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherPosition {
    pub left: String,
    pub top: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// An entry with the same `href` already exists. The collection is
    /// left untouched; `kind` does not participate in the check.
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropSide {
    Before,
    After,
}

/// Menu-list reorder: remove at `from`, then insert at `to` in the
/// shortened sequence. Out-of-range or equal indices are a no-op.
pub fn reorder(pins: &mut Vec<Pin>, from: usize, to: usize) {
    if from == to || from >= pins.len() || to >= pins.len() {
        return;
    }
    let moved = pins.remove(from);
    pins.insert(to, moved);
}

/// Shortcut-bar drop: resolves the insertion index for dropping the item
/// at `from` before or after `target`, adjusted for the removal of the
/// dragged item when it precedes the insertion point. `None` means the
/// drop is a no-op (dropped on itself).
pub fn bar_insertion_index(
    from: usize,
    target: usize,
    side: DropSide,
    len: usize,
) -> Option<usize> {
    if from == target || from >= len || target >= len {
        return None;
    }
    let mut insert_at = match side {
        DropSide::Before => target,
        DropSide::After => target + 1,
    };
    if from < insert_at {
        insert_at -= 1;
    }
    Some(insert_at)
}

/// Persistence and mutation of the ordered pin collection. Every
/// mutation is a read-modify-write of the whole sequence; two
/// concurrent writers race and the last save wins.
pub struct PinStore {
    store: Rc<dyn KeyValueStore>,
}

impl PinStore {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> StorageResult<Vec<Pin>> {
        match self.store.get(PINS_STORAGE_KEY)? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn save(&self, pins: &[Pin]) -> StorageResult<()> {
        self.store
            .set(PINS_STORAGE_KEY, &serde_json::to_value(pins)?)
    }

    /// Appends `pin` unless its `href` is already present. Callers must
    /// re-render every dependent surface after an `Added` outcome.
    pub fn add_pin(&self, pin: Pin) -> StorageResult<AddOutcome> {
        let mut pins = self.load()?;
        if pins.iter().any(|existing| existing.href == pin.href) {
            tracing::debug!(href = %pin.href, "duplicate pin rejected");
            return Ok(AddOutcome::Duplicate);
        }
        pins.push(pin);
        self.save(&pins)?;
        Ok(AddOutcome::Added)
    }

    pub fn remove_at(&self, index: usize) -> StorageResult<Vec<Pin>> {
        let mut pins = self.load()?;
        if index < pins.len() {
            let removed = pins.remove(index);
            tracing::info!(name = %removed.name, "pin removed");
            self.save(&pins)?;
        }
        Ok(pins)
    }

    pub fn move_pin(&self, from: usize, to: usize) -> StorageResult<Vec<Pin>> {
        let mut pins = self.load()?;
        reorder(&mut pins, from, to);
        self.save(&pins)?;
        Ok(pins)
    }

    pub fn move_pin_with_side(
        &self,
        from: usize,
        target: usize,
        side: DropSide,
    ) -> StorageResult<Vec<Pin>> {
        let mut pins = self.load()?;
        if let Some(insert_at) = bar_insertion_index(from, target, side, pins.len()) {
            let moved = pins.remove(from);
            pins.insert(insert_at, moved);
            self.save(&pins)?;
        }
        Ok(pins)
    }

    pub fn load_launcher_position(&self) -> StorageResult<Option<LauncherPosition>> {
        match self.store.get(LAUNCHER_POS_STORAGE_KEY)? {
            Some(value) => Ok(serde_json::from_value(value).ok()),
            None => Ok(None),
        }
    }

    pub fn save_launcher_position(&self, position: &LauncherPosition) -> StorageResult<()> {
        self.store
            .set(LAUNCHER_POS_STORAGE_KEY, &serde_json::to_value(position)?)
    }
}
