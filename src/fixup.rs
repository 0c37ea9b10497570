use crate::html_table::Element;

/// Class the standings page puts on abbreviated labels shown only on
/// narrow viewports.
pub const MOBILE_ONLY_CLASS: &str = "show-on-mobile-inline";

/// Table repair applied before the generic converter runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fixup {
    #[default]
    NoOp,
    Standings,
}

impl Fixup {
    pub fn apply(self, table: &mut Element) {
        match self {
            Fixup::NoOp => {}
            Fixup::Standings => fixup_standings(table),
        }
    }
}

/// Reshapes the supporters-shield standings table so the generic converter
/// can read it.
pub fn fixup_standings(table: &mut Element) {
    // The first row is a grouping header the converter cannot use.
    table.remove_first("tr");

    if let Some(row) = table.find_first_mut("tr") {
        row.for_each_descendant_mut(&mut |el| {
            if el.tag == "td" {
                el.set_tag("th");
            }
        });
    }

    // Mobile spans abbreviate team names erratically and would corrupt the key column.
    table.for_each_descendant_mut(&mut |el| {
        if el.has_class(MOBILE_ONLY_CLASS) {
            el.clear();
        }
    });
}
