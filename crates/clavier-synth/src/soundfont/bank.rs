//! Parsed SoundFont banks.

use crate::error::Error;
use clavier_core::{BankId, LoadError, Program};
use rustysynth::SoundFont;
use std::io::Cursor;
use std::sync::Arc;

/// A parsed SoundFont and its program list, sorted by (bank, patch).
///
/// Cheap to clone: the sample data is shared.
#[derive(Clone)]
pub struct SoundFontBank {
    id: BankId,
    soundfont: Arc<SoundFont>,
    programs: Vec<Program>,
}

impl SoundFontBank {
    /// Parse a complete `.sf2` image.
    pub fn parse(bytes: &[u8]) -> Result<Self, LoadError> {
        if bytes.is_empty() {
            return Err(LoadError::Empty);
        }

        let mut reader = Cursor::new(bytes);
        let soundfont = SoundFont::new(&mut reader)
            .map_err(|e| Error::SoundFont(format!("failed to parse SoundFont: {e}")))?;

        let mut presets: Vec<(i32, i32, String)> = soundfont
            .get_presets()
            .iter()
            .map(|p| (p.get_bank_number(), p.get_patch_number(), p.get_name().to_string()))
            .collect();
        presets.sort_by_key(|&(bank, patch, _)| (bank, patch));

        let programs = presets
            .into_iter()
            .enumerate()
            .map(|(index, (bank_number, patch_number, name))| {
                let name = name.trim_end_matches('\0').trim().to_string();
                Program {
                    index,
                    name: if name.is_empty() {
                        format!("Preset {index}")
                    } else {
                        name
                    },
                    bank_number,
                    patch_number,
                }
            })
            .collect();

        Ok(Self {
            id: BankId::next(),
            soundfont: Arc::new(soundfont),
            programs,
        })
    }

    pub fn id(&self) -> BankId {
        self.id
    }

    pub fn soundfont(&self) -> &Arc<SoundFont> {
        &self.soundfont
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    pub fn program(&self, index: usize) -> Option<&Program> {
        self.programs.get(index)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

impl std::fmt::Debug for SoundFontBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundFontBank")
            .field("id", &self.id)
            .field("programs", &self.programs.len())
            .finish()
    }
}
