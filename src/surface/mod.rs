use serde::{Deserialize, Serialize};

/// Visible text longer than this is truncated before scoring.
pub const MAX_TEXT_LEN: usize = 100;

/// Opaque handle to an on-screen element. Only the UI layer can dereference
/// it; the core treats it as an identity token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Button,
    Link,
    Input,
    Checkbox,
    Select,
    Text,
    Image,
    Container,
    Other,
}

impl Role {
    /// Canonically interactive roles, before any attribute heuristics.
    pub fn is_interactive(&self) -> bool {
        matches!(
            self,
            Role::Button | Role::Link | Role::Input | Role::Checkbox | Role::Select
        )
    }
}

/// What the UI layer reports for one element, verbatim. The scanner distills
/// this into a `TargetableEntity` or drops it.
#[derive(Debug, Clone)]
pub struct RawEntity {
    pub reference: EntityRef,
    pub text: String,
    pub role: Role,
    /// Explicit interactive-role attribute (e.g. role="button" on a div).
    pub interactive_role_attr: bool,
    pub has_click_handler: bool,
    pub pointer_cursor: bool,
    pub hoverable: bool,
    pub visible: bool,
    pub bounds: Rect,
    /// Visually flagged red / alert styling.
    pub emergency_styled: bool,
    /// Element belongs to the assistant's own floating UI.
    pub assistant_owned: bool,
}

/// A scanned, scoreable element. Text is already trimmed and truncated.
#[derive(Debug, Clone)]
pub struct TargetableEntity {
    pub reference: EntityRef,
    pub text: String,
    pub role: Role,
    pub clickable: bool,
    pub bounds: Rect,
    pub emergency_styled: bool,
    pub assistant_owned: bool,
}

/// One scan of the live surface. Never cached: the surface may have changed
/// since the last command, so every resolution attempt scans fresh.
#[derive(Debug, Clone)]
pub struct SurfaceSnapshot {
    pub viewport: Viewport,
    pub entities: Vec<TargetableEntity>,
}

/// The UI layer's enumeration capability. Implementations read the live
/// interactive surface with no locking or snapshot guarantee; a race between
/// scan and execution is accepted and handled downstream.
pub trait SurfaceProvider: Send + Sync {
    fn viewport(&self) -> Viewport;
    fn scan(&self) -> Vec<RawEntity>;
}

/// Distills raw UI elements into targetable entities.
pub struct SurfaceScanner {
    min_dim: f32,
}

impl SurfaceScanner {
    pub fn new(min_dim: f32) -> Self {
        Self { min_dim }
    }

    /// One pass over the provider's current surface. Linear in surface size.
    pub fn scan(&self, provider: &dyn SurfaceProvider) -> SurfaceSnapshot {
        let viewport = provider.viewport();
        let entities = provider
            .scan()
            .into_iter()
            .filter(|raw| {
                raw.visible
                    && raw.bounds.width >= self.min_dim
                    && raw.bounds.height >= self.min_dim
            })
            .map(|raw| {
                let clickable = Self::infer_clickable(&raw);
                TargetableEntity {
                    reference: raw.reference,
                    text: clamp_text(&raw.text),
                    role: raw.role,
                    clickable,
                    bounds: raw.bounds,
                    emergency_styled: raw.emergency_styled,
                    assistant_owned: raw.assistant_owned,
                }
            })
            .collect();

        SurfaceSnapshot { viewport, entities }
    }

    /// Fixed clickability heuristic: canonical interactive role, explicit
    /// role attribute, a click handler, a pointer cursor, or a hover marker.
    fn infer_clickable(raw: &RawEntity) -> bool {
        raw.role.is_interactive()
            || raw.interactive_role_attr
            || raw.has_click_handler
            || raw.pointer_cursor
            || raw.hoverable
    }
}

/// Trim and truncate on a char boundary to keep scoring cheap.
fn clamp_text(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_TEXT_LEN {
        trimmed.to_string()
    } else {
        trimmed.chars().take(MAX_TEXT_LEN).collect()
    }
}
