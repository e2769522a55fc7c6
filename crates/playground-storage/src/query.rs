//! Filter construction for program queries.
//!
//! A [`ProgramFilter`] is the only thing a caller hands to a backend when
//! reading. The Dgraph backend renders it to DQL with [`render_dql`]; the
//! in-memory and SQLite backends evaluate it directly. Uids are typed, so a
//! rendered query never contains caller-supplied text.

use crate::types::ProgramUid;

/// Default number of programs per page.
pub const DEFAULT_PAGE_SIZE: usize = 2;

/// Which stored programs a query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramFilter {
    /// Every stored program.
    All,
    /// The program with exactly this uid.
    ByUid(ProgramUid),
    /// Up to `first` programs whose uid follows `after`.
    Page { after: ProgramUid, first: usize },
}

impl ProgramFilter {
    /// Name of the top-level DQL block the filter renders to. Backends use it
    /// to pick the result array out of the response.
    pub fn block_name(&self) -> &'static str {
        match self {
            ProgramFilter::All => "queryAllPrograms",
            ProgramFilter::ByUid(_) => "node",
            ProgramFilter::Page { .. } => "queryPrograms",
        }
    }

    /// Applies the filter to an ascending-ordered iterator of uids.
    ///
    /// Shared by the backends that evaluate filters themselves so they agree
    /// on page boundaries.
    pub fn select<T, I>(&self, ordered: I) -> Vec<T>
    where
        I: IntoIterator<Item = (ProgramUid, T)>,
    {
        match *self {
            ProgramFilter::All => ordered.into_iter().map(|(_, v)| v).collect(),
            ProgramFilter::ByUid(uid) => ordered
                .into_iter()
                .filter(|(candidate, _)| *candidate == uid)
                .map(|(_, v)| v)
                .take(1)
                .collect(),
            ProgramFilter::Page { after, first } => ordered
                .into_iter()
                .filter(|(candidate, _)| *candidate > after)
                .map(|(_, v)| v)
                .take(first)
                .collect(),
        }
    }
}

/// Renders a filter as a DQL query against the `Code` predicate.
pub fn render_dql(filter: &ProgramFilter) -> String {
    match filter {
        ProgramFilter::All => format!(
            "{{\n  {}(func: has(Code)) {{\n    uid\n    Code\n  }}\n}}",
            filter.block_name()
        ),
        ProgramFilter::ByUid(uid) => format!(
            "{{\n  {}(func: uid({})) @filter(has(Code)) {{\n    uid\n    Code\n  }}\n}}",
            filter.block_name(),
            uid
        ),
        ProgramFilter::Page { after, first } => format!(
            "{{\n  {}(func: has(Code), first: {}, after: {}) {{\n    uid\n    Code\n  }}\n}}",
            filter.block_name(),
            first,
            after
        ),
    }
}
