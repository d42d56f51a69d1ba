//! Label object pool
//!
//! Label visuals are retained across frames and reused by name. A rebuild
//! releases every live label of the series and acquires them again, so a
//! steady-state chart allocates nothing after the first rebuild.

use crate::error::{EngineError, EngineResult};
use crate::layout::LayoutPoint;
use crate::model::{Color, LabelStyle};
use std::collections::HashMap;

/// Handle to a pooled label; valid until the next `release_all`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelHandle(usize);

impl LabelHandle {
    pub fn slot(&self) -> usize {
        self.0
    }
}

/// Stable identity of a label: the series and the point's label index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelKey {
    pub serie_index: usize,
    pub data_index: usize,
}

/// Everything needed to acquire and configure a label
#[derive(Debug, Clone)]
pub struct LabelRequest<'a> {
    pub name: String,
    pub key: LabelKey,
    pub style: &'a LabelStyle,
    /// Initial text colour
    pub color: Color,
    pub icon_size: (f64, f64),
}

/// An on-screen label element
#[derive(Debug, Clone, PartialEq)]
pub struct LabelObject {
    pub name: String,
    /// Point this label is bound to; `None` once released
    pub key: Option<LabelKey>,
    pub active: bool,
    pub text: String,
    pub text_color: Color,
    pub background_color: Color,
    pub font_size: f64,
    /// Rotation in degrees
    pub rotation: f64,
    pub position: LayoutPoint,
    /// Size follows the text when no explicit background size is set
    pub auto_size: bool,
    pub padding: (f64, f64),
    pub icon_active: bool,
    pub icon_size: (f64, f64),
    pub icon_color: Color,
}

impl LabelObject {
    fn new(name: String) -> Self {
        Self {
            name,
            key: None,
            active: false,
            text: String::new(),
            text_color: Color::BLACK,
            background_color: Color::CLEAR,
            font_size: 0.0,
            rotation: 0.0,
            position: LayoutPoint::ZERO,
            auto_size: true,
            padding: (0.0, 0.0),
            icon_active: false,
            icon_size: (0.0, 0.0),
            icon_color: Color::CLEAR,
        }
    }

    fn configure(&mut self, request: &LabelRequest<'_>) {
        let style = request.style;
        self.name = request.name.clone();
        self.key = Some(request.key);
        self.active = true;
        self.text.clear();
        self.text_color = request.color;
        self.background_color = style.text_style.background_color;
        self.font_size = style.text_style.font_size;
        self.rotation = 0.0;
        self.position = LayoutPoint::ZERO;
        self.auto_size = style.background_width == 0.0 || style.background_height == 0.0;
        self.padding = style.padding;
        self.icon_active = false;
        self.icon_size = request.icon_size;
        self.icon_color = Color::CLEAR;
    }

    fn release(&mut self) {
        self.key = None;
        self.active = false;
    }
}

/// Pool of label visuals for one series
pub trait VisualPool {
    /// Get a label by name, reusing a released one when possible
    fn acquire(&mut self, request: &LabelRequest<'_>) -> EngineResult<LabelHandle>;

    /// Return every live label to the pool
    fn release_all(&mut self);

    /// Live label for a handle
    fn label(&self, handle: LabelHandle) -> Option<&LabelObject>;

    /// Mutable live label for a handle
    fn label_mut(&mut self, handle: LabelHandle) -> Option<&mut LabelObject>;

    /// Number of labels currently handed out
    fn live_count(&self) -> usize;
}

struct Slot {
    object: LabelObject,
    in_use: bool,
}

/// Arena-backed [`VisualPool`]
pub struct LabelPool {
    slots: Vec<Slot>,
    /// Slots released by the last `release_all`; entries reclaimed by name
    /// since then are skipped when popped
    free: Vec<usize>,
    by_name: HashMap<String, usize>,
    capacity: Option<usize>,
    live: usize,
}

impl Default for LabelPool {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelPool {
    /// Create an unbounded pool
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            by_name: HashMap::new(),
            capacity: None,
            live: 0,
        }
    }

    /// Create a pool holding at most `capacity` live labels
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::new()
        }
    }

    pub fn set_capacity_limit(&mut self, capacity: Option<usize>) {
        self.capacity = capacity;
    }

    /// Number of label objects ever allocated
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Iterate over live labels
    pub fn iter_live(&self) -> impl Iterator<Item = (LabelHandle, &LabelObject)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.in_use)
            .map(|(i, slot)| (LabelHandle(i), &slot.object))
    }

    /// Find a live label by name
    pub fn find(&self, name: &str) -> Option<LabelHandle> {
        let slot = *self.by_name.get(name)?;
        self.slots[slot].in_use.then_some(LabelHandle(slot))
    }

    fn claim_slot(&mut self, name: &str) -> usize {
        if let Some(&slot) = self.by_name.get(name) {
            return slot;
        }
        while let Some(slot) = self.free.pop() {
            if !self.slots[slot].in_use {
                let old_name = std::mem::take(&mut self.slots[slot].object.name);
                if self.by_name.get(&old_name) == Some(&slot) {
                    self.by_name.remove(&old_name);
                }
                self.by_name.insert(name.to_string(), slot);
                return slot;
            }
        }
        self.slots.push(Slot {
            object: LabelObject::new(name.to_string()),
            in_use: false,
        });
        let slot = self.slots.len() - 1;
        self.by_name.insert(name.to_string(), slot);
        slot
    }
}

impl VisualPool for LabelPool {
    fn acquire(&mut self, request: &LabelRequest<'_>) -> EngineResult<LabelHandle> {
        let already_live = self.find(&request.name);
        if already_live.is_none() {
            if let Some(capacity) = self.capacity {
                if self.live >= capacity {
                    return Err(EngineError::PoolExhausted { capacity });
                }
            }
        }

        let slot = self.claim_slot(&request.name);
        let entry = &mut self.slots[slot];
        if !entry.in_use {
            entry.in_use = true;
            self.live += 1;
        }
        entry.object.configure(request);
        Ok(LabelHandle(slot))
    }

    fn release_all(&mut self) {
        self.free.clear();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.in_use {
                slot.in_use = false;
                slot.object.release();
                self.free.push(i);
            }
        }
        self.live = 0;
    }

    fn label(&self, handle: LabelHandle) -> Option<&LabelObject> {
        self.slots
            .get(handle.0)
            .filter(|slot| slot.in_use)
            .map(|slot| &slot.object)
    }

    fn label_mut(&mut self, handle: LabelHandle) -> Option<&mut LabelObject> {
        self.slots
            .get_mut(handle.0)
            .filter(|slot| slot.in_use)
            .map(|slot| &mut slot.object)
    }

    fn live_count(&self) -> usize {
        self.live
    }
}
