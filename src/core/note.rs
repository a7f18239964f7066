/// One entry of the note vocabulary: a classifier label together with the
/// oscillator frequency and conventional pitch name it maps to.
#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    pub label: String,
    pub frequency_hz: f64,
    pub pitch: String,
}

impl Note {
    pub fn new(label: &str, frequency_hz: f64, pitch: &str) -> Note {
        Note {
            label: label.to_string(),
            frequency_hz,
            pitch: pitch.to_string(),
        }
    }
}

/// The label vocabulary as data. The classifier discovers labels on its own;
/// the table only decides which frequency a predicted label drives.
#[derive(Clone, Debug, Default)]
pub struct NoteTable {
    notes: Vec<Note>,
}

impl NoteTable {
    pub fn from_notes(notes: Vec<Note>) -> NoteTable {
        NoteTable { notes }
    }

    /// The eight-note solfège scale of the original demo, C4 through C5.
    pub fn solfege() -> NoteTable {
        NoteTable {
            notes: vec![
                Note::new("Do", 262.0, "C4"),
                Note::new("Re", 294.0, "D4"),
                Note::new("Mi", 330.0, "E4"),
                Note::new("Fa", 350.0, "F4"),
                Note::new("Sol", 392.0, "G4"),
                Note::new("La", 440.0, "A4"),
                Note::new("Ti", 494.0, "B4"),
                Note::new("Do5", 523.0, "C5"),
            ],
        }
    }

    pub fn get(&self, label: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.label == label)
    }

    pub fn frequency_of(&self, label: &str) -> Option<f64> {
        self.get(label).map(|n| n.frequency_hz)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.notes.iter().map(|n| n.label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
