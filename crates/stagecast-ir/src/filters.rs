//! Per-layer filter state: the always-on transform/opacity group plus the
//! small catalog of toggleable effects.

use serde::{Deserialize, Serialize};

/// A toggleable effect kind. The transform/opacity group is always active
/// and therefore not part of this catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    HueRotate,
    /// Brightness, contrast and saturate share one switch.
    ColorAdjust,
    Blur,
    UvScroll,
}

impl FilterKind {
    /// Every kind, in catalog order.
    pub const ALL: [FilterKind; 4] = [
        FilterKind::HueRotate,
        FilterKind::ColorAdjust,
        FilterKind::Blur,
        FilterKind::UvScroll,
    ];

    fn index(self) -> usize {
        match self {
            FilterKind::HueRotate => 0,
            FilterKind::ColorAdjust => 1,
            FilterKind::Blur => 2,
            FilterKind::UvScroll => 3,
        }
    }

    /// Identifier used in scene documents.
    pub fn id(self) -> &'static str {
        match self {
            FilterKind::HueRotate => "hueRotate",
            FilterKind::ColorAdjust => "colorAdjust",
            FilterKind::Blur => "blur",
            FilterKind::UvScroll => "uvScroll",
        }
    }

    pub fn from_id(id: &str) -> Option<FilterKind> {
        FilterKind::ALL.into_iter().find(|k| k.id() == id)
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Attachment state of one effect kind on one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterState {
    /// Not part of the layer's pipeline.
    #[default]
    Detached,
    /// Attached and applied.
    Enabled,
    /// Attached but suppressed; parameters are kept.
    Disabled,
}

/// One [`FilterState`] per [`FilterKind`].
///
/// Serialized documents carry this as two string arrays (`activeFilters`,
/// `disabledFilters`); in memory a kind cannot be disabled without being
/// attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterToggles {
    states: [FilterState; 4],
}

impl FilterToggles {
    pub fn state(&self, kind: FilterKind) -> FilterState {
        self.states[kind.index()]
    }

    /// Attached and not disabled.
    pub fn is_in_effect(&self, kind: FilterKind) -> bool {
        self.state(kind) == FilterState::Enabled
    }

    pub fn is_attached(&self, kind: FilterKind) -> bool {
        self.state(kind) != FilterState::Detached
    }

    /// Attach `kind` (enabled). Already attached kinds keep their state.
    pub fn attach(&mut self, kind: FilterKind) {
        if !self.is_attached(kind) {
            self.states[kind.index()] = FilterState::Enabled;
        }
    }

    /// Detach `kind`, clearing both its attachment and its disabled flag.
    pub fn remove(&mut self, kind: FilterKind) {
        self.states[kind.index()] = FilterState::Detached;
    }

    /// Switch an attached kind on or off. Detached kinds are left alone.
    pub fn set_enabled(&mut self, kind: FilterKind, enabled: bool) {
        if self.is_attached(kind) {
            self.states[kind.index()] = if enabled {
                FilterState::Enabled
            } else {
                FilterState::Disabled
            };
        }
    }

    /// Attached kinds in catalog order (the `activeFilters` set).
    pub fn attached(&self) -> impl Iterator<Item = FilterKind> + '_ {
        FilterKind::ALL
            .into_iter()
            .filter(move |k| self.is_attached(*k))
    }

    /// Suppressed kinds in catalog order (the `disabledFilters` set).
    pub fn disabled(&self) -> impl Iterator<Item = FilterKind> + '_ {
        FilterKind::ALL
            .into_iter()
            .filter(move |k| self.state(*k) == FilterState::Disabled)
    }

    /// Build from the two document sets. Disabled kinds that are not also
    /// active are dropped.
    pub fn from_sets(active: &[FilterKind], disabled: &[FilterKind]) -> Self {
        let mut toggles = FilterToggles::default();
        for kind in active {
            toggles.attach(*kind);
        }
        for kind in disabled {
            toggles.set_enabled(*kind, false);
        }
        toggles
    }
}

/// Effect parameters of one layer. Every field has a default, so partial
/// documents deserialize by merging over [`LayerFilters::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LayerFiltersDoc", into = "LayerFiltersDoc")]
pub struct LayerFilters {
    /// Percent, 0–100.
    pub opacity: f64,
    /// Pixels, applied before scale and rotation.
    pub offset_x: f64,
    pub offset_y: f64,
    /// Uniform factor, nominally 0.1–3.0.
    pub scale: f64,
    /// Degrees.
    pub rotation: f64,
    /// Degrees.
    pub hue_rotate: f64,
    /// Percent, 100 is neutral.
    pub brightness: f64,
    pub contrast: f64,
    pub saturate: f64,
    /// Pixel radius.
    pub blur: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    /// Scroll velocity in units per second.
    pub uv_scroll_x: f64,
    pub uv_scroll_y: f64,
    pub visible: bool,
    pub toggles: FilterToggles,
}

impl Default for LayerFilters {
    fn default() -> Self {
        Self {
            opacity: 100.0,
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
            rotation: 0.0,
            hue_rotate: 0.0,
            brightness: 100.0,
            contrast: 100.0,
            saturate: 100.0,
            blur: 0.0,
            flip_x: false,
            flip_y: false,
            uv_scroll_x: 0.0,
            uv_scroll_y: 0.0,
            visible: true,
            toggles: FilterToggles::default(),
        }
    }
}

impl LayerFilters {
    /// Shallow-merge `patch`: only the fields it carries change.
    pub fn apply_patch(&mut self, patch: &FiltersPatch) {
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = patch.$field { self.$field = v; })*
            };
        }
        merge!(
            opacity,
            offset_x,
            offset_y,
            scale,
            rotation,
            hue_rotate,
            brightness,
            contrast,
            saturate,
            blur,
            flip_x,
            flip_y,
            uv_scroll_x,
            uv_scroll_y,
            visible,
        );

        if patch.active_filters.is_some() || patch.disabled_filters.is_some() {
            let active: Vec<FilterKind> = match &patch.active_filters {
                Some(active) => active.clone(),
                None => self.toggles.attached().collect(),
            };
            let disabled: Vec<FilterKind> = match &patch.disabled_filters {
                Some(disabled) => disabled.clone(),
                None => self.toggles.disabled().collect(),
            };
            self.toggles = FilterToggles::from_sets(&active, &disabled);
        }
    }

    /// Reset every parameter to its default while keeping the attached
    /// effect pipeline.
    pub fn reset_parameters(&mut self) {
        *self = LayerFilters {
            toggles: self.toggles,
            ..LayerFilters::default()
        };
    }
}

/// A partial [`LayerFilters`] update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FiltersPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue_rotate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flip_x: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flip_y: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uv_scroll_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uv_scroll_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_filters: Option<Vec<FilterKind>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled_filters: Option<Vec<FilterKind>>,
}

/// Wire shape of [`LayerFilters`]: camelCase keys, string-array toggles,
/// and defaults for every missing key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LayerFiltersDoc {
    opacity: f64,
    offset_x: f64,
    offset_y: f64,
    scale: f64,
    rotation: f64,
    hue_rotate: f64,
    brightness: f64,
    contrast: f64,
    saturate: f64,
    blur: f64,
    flip_x: bool,
    flip_y: bool,
    uv_scroll_x: f64,
    uv_scroll_y: f64,
    visible: bool,
    active_filters: Vec<String>,
    disabled_filters: Vec<String>,
}

impl Default for LayerFiltersDoc {
    fn default() -> Self {
        LayerFilters::default().into()
    }
}

fn parse_kinds(ids: &[String]) -> Vec<FilterKind> {
    ids.iter()
        .filter_map(|id| {
            let kind = FilterKind::from_id(id);
            if kind.is_none() {
                tracing::warn!("ignoring unknown filter kind '{}'", id);
            }
            kind
        })
        .collect()
}

impl From<LayerFiltersDoc> for LayerFilters {
    fn from(doc: LayerFiltersDoc) -> Self {
        let toggles = FilterToggles::from_sets(
            &parse_kinds(&doc.active_filters),
            &parse_kinds(&doc.disabled_filters),
        );
        Self {
            opacity: doc.opacity,
            offset_x: doc.offset_x,
            offset_y: doc.offset_y,
            scale: doc.scale,
            rotation: doc.rotation,
            hue_rotate: doc.hue_rotate,
            brightness: doc.brightness,
            contrast: doc.contrast,
            saturate: doc.saturate,
            blur: doc.blur,
            flip_x: doc.flip_x,
            flip_y: doc.flip_y,
            uv_scroll_x: doc.uv_scroll_x,
            uv_scroll_y: doc.uv_scroll_y,
            visible: doc.visible,
            toggles,
        }
    }
}

impl From<LayerFilters> for LayerFiltersDoc {
    fn from(f: LayerFilters) -> Self {
        Self {
            opacity: f.opacity,
            offset_x: f.offset_x,
            offset_y: f.offset_y,
            scale: f.scale,
            rotation: f.rotation,
            hue_rotate: f.hue_rotate,
            brightness: f.brightness,
            contrast: f.contrast,
            saturate: f.saturate,
            blur: f.blur,
            flip_x: f.flip_x,
            flip_y: f.flip_y,
            uv_scroll_x: f.uv_scroll_x,
            uv_scroll_y: f.uv_scroll_y,
            visible: f.visible,
            active_filters: f.toggles.attached().map(|k| k.id().to_string()).collect(),
            disabled_filters: f.toggles.disabled().map(|k| k.id().to_string()).collect(),
        }
    }
}
