//! Widget registry: the closed set of widget kinds and their capabilities.
//!
//! Every kind maps to one static [`WidgetSpec`] describing its display label,
//! category, default grid size, and the settings form the editor renders.
//! There is no runtime registration; adding a kind means adding a variant.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::grid::GridSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    Clock,
    Calendar,
    Note,
    Image,
    Link,
    Weather,
    Rss,
    Glances,
    Deluge,
    Pihole,
    Jellyfin,
    Fetch,
    Pipes,
    Matrix,
    HelloWorld,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 15] = [
        Self::Clock,
        Self::Calendar,
        Self::Note,
        Self::Image,
        Self::Link,
        Self::Weather,
        Self::Rss,
        Self::Glances,
        Self::Deluge,
        Self::Pihole,
        Self::Jellyfin,
        Self::Fetch,
        Self::Pipes,
        Self::Matrix,
        Self::HelloWorld,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clock => "clock",
            Self::Calendar => "calendar",
            Self::Note => "note",
            Self::Image => "image",
            Self::Link => "link",
            Self::Weather => "weather",
            Self::Rss => "rss",
            Self::Glances => "glances",
            Self::Deluge => "deluge",
            Self::Pihole => "pihole",
            Self::Jellyfin => "jellyfin",
            Self::Fetch => "fetch",
            Self::Pipes => "pipes",
            Self::Matrix => "matrix",
            Self::HelloWorld => "hello-world",
        }
    }

    /// Inverse of [`as_str`](Self::as_str). Unknown names yield `None`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    #[must_use]
    pub fn spec(self) -> &'static WidgetSpec {
        match self {
            Self::Clock => &CLOCK,
            Self::Calendar => &CALENDAR,
            Self::Note => &NOTE,
            Self::Image => &IMAGE,
            Self::Link => &LINK,
            Self::Weather => &WEATHER,
            Self::Rss => &RSS,
            Self::Glances => &GLANCES,
            Self::Deluge => &DELUGE,
            Self::Pihole => &PIHOLE,
            Self::Jellyfin => &JELLYFIN,
            Self::Fetch => &FETCH,
            Self::Pipes => &PIPES,
            Self::Matrix => &MATRIX,
            Self::HelloWorld => &HELLO_WORLD,
        }
    }

    /// Fill in every setting default missing from `data`. Existing keys win.
    pub fn apply_defaults(self, data: &mut Map<String, Value>) {
        for field in self.spec().settings {
            if let Some(default) = field.default {
                data.entry(field.name).or_insert_with(|| Value::String(default.to_owned()));
            }
        }
    }
}

impl std::fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// SPEC TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Renders from its own settings only.
    Static,
    /// Polls an external service from the browser.
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    Textarea,
    Select,
    Color,
    ImageSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub label: &'static str,
    pub value: &'static str,
}

/// One input in a widget's settings form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingField {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    #[serde(skip_serializing_if = "no_options")]
    pub options: &'static [SelectOption],
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn no_options(options: &&'static [SelectOption]) -> bool {
    options.is_empty()
}

impl SettingField {
    const fn new(kind: FieldKind, name: &'static str, label: &'static str) -> Self {
        Self { name, label, kind, default: None, placeholder: None, options: &[] }
    }

    const fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(FieldKind::Text, name, label)
    }

    const fn select(name: &'static str, label: &'static str, options: &'static [SelectOption]) -> Self {
        Self { options, ..Self::new(FieldKind::Select, name, label) }
    }

    const fn with_default(self, value: &'static str) -> Self {
        Self { default: Some(value), ..self }
    }

    const fn with_placeholder(self, value: &'static str) -> Self {
        Self { placeholder: Some(value), ..self }
    }
}

/// Static capability record for one widget kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSpec {
    pub kind: WidgetKind,
    pub label: &'static str,
    pub category: Category,
    pub default_size: GridSize,
    pub settings: &'static [SettingField],
}

const fn opt(label: &'static str, value: &'static str) -> SelectOption {
    SelectOption { label, value }
}

// =============================================================================
// REGISTRY TABLE
// =============================================================================

const YES_NO: &[SelectOption] = &[opt("No", "false"), opt("Yes", "true")];
const CLOCK_FORMATS: &[SelectOption] = &[opt("12-Hour (AM/PM)", "12"), opt("24-Hour", "24")];
const IMAGE_FITS: &[SelectOption] = &[opt("Photo (Fill Area)", "cover"), opt("Logo / SVG (Fit w/ Padding)", "contain")];
const LINK_COLORIZE: &[SelectOption] = &[opt("No (Original Colors)", "false"), opt("Yes (Monochrome)", "true")];
const LINK_DISPLAY: &[SelectOption] = &[opt("Standard (Icon + Text)", "standard"), opt("Cover (Full Card)", "cover")];
const GLANCES_API: &[SelectOption] = &[opt("v3 (Standard)", "3"), opt("v2 (Legacy)", "2"), opt("v4 (Latest)", "4")];
const FETCH_API: &[SelectOption] = &[opt("v3", "3"), opt("v4", "4"), opt("v2", "2")];
const TEXT_ALIGN: &[SelectOption] = &[opt("Left", "left"), opt("Center", "center"), opt("Right", "right")];
const GLANCES_METRICS: &[SelectOption] = &[
    opt("CPU (Graph)", "cpu"),
    opt("CPU (Per Core)", "percpu"),
    opt("Memory (Graph)", "mem"),
    opt("Network (Graph)", "net"),
    opt("Disk I/O & Usage", "disk"),
    opt("Docker Containers", "docker"),
    opt("Top Processes", "process"),
    opt("Temperatures (List)", "sensors"),
    opt("System Uptime", "uptime"),
];

static CLOCK: WidgetSpec = WidgetSpec {
    kind: WidgetKind::Clock,
    label: "Clock",
    category: Category::Static,
    default_size: GridSize::new(1, 1),
    settings: &[SettingField::select("format", "Time Format", CLOCK_FORMATS).with_default("12")],
};

static CALENDAR: WidgetSpec = WidgetSpec {
    kind: WidgetKind::Calendar,
    label: "Calendar",
    category: Category::Static,
    default_size: GridSize::new(2, 2),
    settings: &[],
};

static NOTE: WidgetSpec = WidgetSpec {
    kind: WidgetKind::Note,
    label: "Sticky Note",
    category: Category::Static,
    default_size: GridSize::new(1, 1),
    settings: &[
        SettingField::text("title", "Title").with_placeholder("My Note"),
        SettingField::new(FieldKind::Color, "bgColor", "Background Color").with_default("var(--bg-surface)"),
    ],
};

static IMAGE: WidgetSpec = WidgetSpec {
    kind: WidgetKind::Image,
    label: "Image Frame",
    category: Category::Static,
    default_size: GridSize::new(1, 1),
    settings: &[
        SettingField::new(FieldKind::ImageSource, "src", "Image Source"),
        SettingField::select("fit", "Display Style", IMAGE_FITS).with_default("cover"),
    ],
};

static LINK: WidgetSpec = WidgetSpec {
    kind: WidgetKind::Link,
    label: "Link Button",
    category: Category::Static,
    default_size: GridSize::new(1, 1),
    settings: &[
        SettingField::text("url", "URL").with_placeholder("https://..."),
        SettingField::new(FieldKind::ImageSource, "icon", "Icon").with_placeholder("fa-fire OR https://..."),
        SettingField::select("colorize", "Colorize Icon (Match Text)", LINK_COLORIZE).with_default("false"),
        SettingField::select("display", "Display Mode", LINK_DISPLAY).with_default("standard"),
        SettingField::text("iconSize", "Icon Size (Standard Mode)").with_placeholder("e.g. 50px"),
        SettingField::select("hideLabel", "Hide Text Label", YES_NO).with_default("false"),
    ],
};

static WEATHER: WidgetSpec = WidgetSpec {
    kind: WidgetKind::Weather,
    label: "Weather",
    category: Category::Static,
    default_size: GridSize::new(1, 1),
    settings: &[
        SettingField::text("lat", "Latitude").with_placeholder("e.g. 51.50"),
        SettingField::text("lon", "Longitude").with_placeholder("e.g. -0.12"),
    ],
};

static RSS: WidgetSpec = WidgetSpec {
    kind: WidgetKind::Rss,
    label: "RSS Reader",
    category: Category::Data,
    default_size: GridSize::new(2, 2),
    settings: &[
        SettingField::new(FieldKind::Textarea, "url", "Feed URLs")
            .with_placeholder("https://site1.com/rss\nhttps://site2.com/feed"),
        SettingField::text("customTitle", "Header Title").with_placeholder("My Feeds"),
        SettingField::text("interval", "Refresh (ms)").with_default("900000"),
    ],
};

static GLANCES: WidgetSpec = WidgetSpec {
    kind: WidgetKind::Glances,
    label: "Glances Monitor",
    category: Category::Data,
    default_size: GridSize::new(1, 1),
    settings: &[
        SettingField::text("url", "Glances URL").with_default("http://localhost:61208"),
        SettingField::select("apiVer", "API Version", GLANCES_API).with_default("4"),
        SettingField::select("metric", "Mode", GLANCES_METRICS).with_default("cpu"),
        SettingField::text("interval", "Interval (ms)").with_default("1000"),
    ],
};

static DELUGE: WidgetSpec = WidgetSpec {
    kind: WidgetKind::Deluge,
    label: "Deluge Client",
    category: Category::Data,
    default_size: GridSize::new(2, 2),
    settings: &[
        SettingField::text("url", "JSON-RPC URL").with_default("/deluge-api/json"),
        SettingField::text("password", "Web Password"),
        SettingField::text("interval", "Interval (ms)").with_default("3000"),
    ],
};

static PIHOLE: WidgetSpec = WidgetSpec {
    kind: WidgetKind::Pihole,
    label: "Pi-hole Stats",
    category: Category::Data,
    default_size: GridSize::new(2, 1),
    settings: &[
        SettingField::text("url", "API URL (Use /pi-api/...)").with_default("/pi-api/api"),
        SettingField::text("token", "API Token / Password").with_placeholder("Web Interface Password"),
        SettingField::text("interval", "Interval (ms)").with_default("5000"),
    ],
};

static JELLYFIN: WidgetSpec = WidgetSpec {
    kind: WidgetKind::Jellyfin,
    label: "Jellyfin Media",
    category: Category::Data,
    default_size: GridSize::new(2, 2),
    settings: &[
        SettingField::text("url", "Server URL").with_placeholder("http://localhost:8096"),
        SettingField::text("apiKey", "API Key").with_placeholder("Dashboard > API Keys"),
        SettingField::text("userId", "User ID / Name").with_placeholder("admin"),
        SettingField::text("interval", "Interval (ms)").with_default("5000"),
    ],
};

static FETCH: WidgetSpec = WidgetSpec {
    kind: WidgetKind::Fetch,
    label: "System Fetch",
    category: Category::Data,
    default_size: GridSize::new(2, 1),
    settings: &[
        SettingField::text("glancesUrl", "Glances URL").with_default("http://localhost:61208"),
        SettingField::select("apiVer", "API Version", FETCH_API).with_default("4"),
        SettingField::new(FieldKind::ImageSource, "imgSrc", "Avatar Image"),
    ],
};

static PIPES: WidgetSpec = WidgetSpec {
    kind: WidgetKind::Pipes,
    label: "Pipes",
    category: Category::Static,
    default_size: GridSize::new(1, 1),
    settings: &[
        SettingField::text("pipeCount", "Number of Pipes").with_default("3"),
        SettingField::text("gridSize", "Thickness (px)").with_default("20"),
        SettingField::text("speed", "Speed (ms)").with_default("50"),
    ],
};

static MATRIX: WidgetSpec = WidgetSpec {
    kind: WidgetKind::Matrix,
    label: "Matrix",
    category: Category::Static,
    default_size: GridSize::new(1, 1),
    settings: &[
        SettingField::new(FieldKind::Color, "color", "Matrix Color").with_default("#00FF00"),
        SettingField::text("speed", "Speed (Lower is Faster)").with_default("50"),
    ],
};

static HELLO_WORLD: WidgetSpec = WidgetSpec {
    kind: WidgetKind::HelloWorld,
    label: "Hello World",
    category: Category::Static,
    default_size: GridSize::new(2, 1),
    settings: &[
        SettingField::text("text", "Greeting Message").with_placeholder("e.g. Hello, World!"),
        SettingField::text("icon", "Icon Name").with_placeholder("e.g. rocket, heart, code"),
        SettingField::select("align", "Text Alignment", TEXT_ALIGN).with_default("center"),
    ],
};

/// Every spec, in menu order.
#[must_use]
pub fn all_specs() -> Vec<&'static WidgetSpec> {
    WidgetKind::ALL.iter().map(|kind| kind.spec()).collect()
}

#[cfg(test)]
#[path = "widgets_test.rs"]
mod tests;
