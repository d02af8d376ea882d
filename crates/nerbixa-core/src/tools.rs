//! Static catalog of the AI tools offered to users.

use serde::Serialize;

/// Price charged for a tool id that is not in the catalog.
pub const FALLBACK_PRICE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolConfig {
    pub id: String,
    pub title: String,
    pub gradient: String,
    pub price: u32,
}

impl ToolConfig {
    pub fn new(id: impl Into<String>, title: impl Into<String>, gradient: impl Into<String>) -> Self {
        let id = id.into();
        let price = tool_price(&id);
        Self {
            id,
            title: title.into(),
            gradient: gradient.into(),
            price,
        }
    }
}

struct CatalogEntry {
    id: &'static str,
    title: &'static str,
    gradient: &'static str,
    price: u32,
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: "master-chef",
        title: "Master Chef",
        gradient: "from-amber-400 via-orange-500 to-red-600",
        price: 0,
    },
    CatalogEntry {
        id: "master-nutritionist",
        title: "Master Nutritionist",
        gradient: "from-emerald-400 via-green-500 to-teal-600",
        price: 150,
    },
    CatalogEntry {
        id: "cal-tracker",
        title: "Cal Tracker",
        gradient: "from-blue-400 via-cyan-500 to-indigo-600",
        price: 50,
    },
];

fn entry(id: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.id == id)
}

/// Price for `id`. A catalog price of 0 is returned as-is.
pub fn tool_price(id: &str) -> u32 {
    entry(id).map(|entry| entry.price).unwrap_or(FALLBACK_PRICE)
}

pub fn find_tool(id: &str) -> Option<ToolConfig> {
    entry(id).map(|entry| ToolConfig {
        id: entry.id.to_string(),
        title: entry.title.to_string(),
        gradient: entry.gradient.to_string(),
        price: entry.price,
    })
}

/// Catalog entry for `id`, or a generic descriptor titled after the id.
pub fn tool_or_default(id: &str) -> ToolConfig {
    find_tool(id).unwrap_or_else(|| ToolConfig::new(id, id, "from-gray-400 to-gray-600"))
}

pub fn all_tools() -> Vec<ToolConfig> {
    CATALOG.iter().filter_map(|entry| find_tool(entry.id)).collect()
}
