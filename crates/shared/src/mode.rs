use crate::models::Position;

/// What a click on the map means right now. Exactly one variant is active,
/// so placing, editing and relocating can never overlap.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionMode {
    #[default]
    Idle,
    /// Waiting for a map click; once clicked, the position is held here until
    /// the form is submitted or cancelled. No pin exists yet.
    Placing { pending: Option<Position> },
    Editing(String),
    Relocating(String),
}

/// Result of feeding a map click through the mode machine.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Clear the current selection; nothing is created or moved.
    Deselect,
    /// A new pin's position was chosen; the form should open.
    Pending(Position),
    /// Move an existing pin to `position`.
    Relocate { id: String, position: Position },
}

impl InteractionMode {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionMode::Idle)
    }

    pub fn is_placing(&self) -> bool {
        matches!(self, InteractionMode::Placing { .. })
    }

    pub fn pending_position(&self) -> Option<Position> {
        match self {
            InteractionMode::Placing { pending } => *pending,
            _ => None,
        }
    }

    pub fn editing_id(&self) -> Option<&str> {
        match self {
            InteractionMode::Editing(id) => Some(id),
            _ => None,
        }
    }

    pub fn relocating_id(&self) -> Option<&str> {
        match self {
            InteractionMode::Relocating(id) => Some(id),
            _ => None,
        }
    }

    /// The pin this mode is bound to, if any.
    pub fn target_id(&self) -> Option<&str> {
        self.editing_id().or_else(|| self.relocating_id())
    }

    /// Panning is off while a click has to pick a position.
    pub fn suppresses_pan(&self) -> bool {
        matches!(
            self,
            InteractionMode::Placing { .. } | InteractionMode::Relocating(_)
        )
    }

    /// Markers ignore the pointer while a position is being picked, so clicks
    /// land on the map even on top of an existing pin.
    pub fn markers_interactive(&self) -> bool {
        !self.suppresses_pan()
    }

    /// CSS cursor for the map surface.
    pub fn cursor(&self, dragging: bool) -> &'static str {
        if self.suppresses_pan() {
            "crosshair"
        } else if dragging {
            "grabbing"
        } else {
            "grab"
        }
    }

    pub fn request_add(&mut self) {
        *self = InteractionMode::Placing { pending: None };
    }

    /// Start editing `id`. Ignored while a position is being picked.
    pub fn select(&mut self, id: &str) -> bool {
        match self {
            InteractionMode::Idle | InteractionMode::Editing(_) => {
                *self = InteractionMode::Editing(id.to_string());
                true
            }
            _ => false,
        }
    }

    /// Editing(id) becomes Relocating(id). Returns the pin id on success.
    pub fn request_relocate(&mut self) -> Option<String> {
        let id = self.editing_id()?.to_string();
        *self = InteractionMode::Relocating(id.clone());
        Some(id)
    }

    /// Interpret a click on the map at `position`.
    ///
    /// Relocating moves back to Editing of the same pin; the caller applies
    /// the position change.
    pub fn map_click(&mut self, position: Position) -> ClickOutcome {
        match self {
            InteractionMode::Placing { pending } => {
                *pending = Some(position);
                ClickOutcome::Pending(position)
            }
            InteractionMode::Relocating(id) => {
                let id = std::mem::take(id);
                *self = InteractionMode::Editing(id.clone());
                ClickOutcome::Relocate { id, position }
            }
            InteractionMode::Editing(_) | InteractionMode::Idle => {
                *self = InteractionMode::Idle;
                ClickOutcome::Deselect
            }
        }
    }

    pub fn cancel(&mut self) {
        *self = InteractionMode::Idle;
    }
}
