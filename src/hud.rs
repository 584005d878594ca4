use strum::IntoEnumIterator;

use crate::world::block::BlockKind;

/// Placeable block kinds in palette order with the active selection.
#[derive(Debug, Clone)]
pub struct Palette {
    entries: Vec<BlockKind>,
    selected: BlockKind,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            entries: BlockKind::iter().filter(BlockKind::is_placeable).collect(),
            selected: BlockKind::Grass,
        }
    }
}

impl Palette {
    pub fn entries(&self) -> &[BlockKind] {
        &self.entries
    }

    pub fn selected(&self) -> BlockKind {
        self.selected
    }

    /// Number key shortcut, `1` picks the first entry. Keys outside the
    /// palette leave the selection alone.
    pub fn select_key(&mut self, key: usize) -> Option<BlockKind> {
        let kind = *self.entries.get(key.checked_sub(1)?)?;
        self.selected = kind;
        Some(kind)
    }

    // click on a palette entry
    pub fn select(&mut self, kind: BlockKind) -> eyre::Result<()> {
        eyre::ensure!(self.entries.contains(&kind), "{kind} is not in the palette");
        self.selected = kind;
        Ok(())
    }

    pub fn hint(&self) -> String {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, kind)| {
                let marker = if *kind == self.selected { "*" } else { " " };
                format!("{marker}{} {}", idx + 1, kind.label())
            })
            .collect::<Vec<_>>()
            .join("  ")
    }
}
