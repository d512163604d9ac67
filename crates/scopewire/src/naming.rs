//! Service name inference
//!
//! Names are derived from `std::any::type_name`, so `Arc<Foo>`, `Box<Foo>` and
//! `Foo` are distinct services, and two `Foo`s declared in different modules
//! never collide under the default strategy.

use serde::{Deserialize, Serialize};

/// How a service name is derived from its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    /// Full type path, e.g. `alloc::sync::Arc<my_app::db::Pool>`
    #[default]
    FullyQualified,
    /// Module paths stripped, e.g. `Arc<Pool>`.
    ///
    /// Types with the same name in different modules share a name under this
    /// strategy.
    Short,
}

impl NamingStrategy {
    pub fn name_of<T: ?Sized + 'static>(self) -> String {
        let full = std::any::type_name::<T>();
        match self {
            Self::FullyQualified => full.to_string(),
            Self::Short => shorten(full),
        }
    }
}

/// Default name of the service of type `T`.
///
/// Prefer type-based resolution over hard-coding the returned string.
pub fn name<T: ?Sized + 'static>() -> String {
    NamingStrategy::default().name_of::<T>()
}

/// Strip every `a::b::` module prefix while keeping generic structure.
fn shorten(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();

    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            segment.push(ch);
        } else {
            out.push_str(last_path_segment(&segment));
            segment.clear();
            out.push(ch);
        }
    }
    out.push_str(last_path_segment(&segment));
    out
}

fn last_path_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}
