//! Line edits planned against an immutable snapshot.
//!
//! Stages that insert or replace whole lines record `(position, kind,
//! payload)` edits against the original line list, then fold them into a
//! fresh buffer. Positions always refer to the snapshot, so no edit can
//! shift the position of another.

/// What an edit does at its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// Insert the payload before the line at `position`
    /// (`position == len` appends)
    InsertBefore,
    /// Replace lines `position..end` with the payload
    Replace {
        /// Exclusive end line
        end: usize,
    },
}

impl EditKind {
    // Replacements fold first so insertions at the same position stay above them.
    fn order(self) -> u8 {
        match self {
            EditKind::Replace { .. } => 0,
            EditKind::InsertBefore => 1,
        }
    }
}

/// A single planned edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Line index in the snapshot
    pub position: usize,
    /// Edit kind
    pub kind: EditKind,
    /// Text to emit, including its own line terminator
    pub payload: String,
}

/// An ordered collection of edits.
#[derive(Debug, Clone, Default)]
pub struct EditPlan {
    edits: Vec<Edit>,
}

impl EditPlan {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan an insertion before line `position`.
    pub fn insert_before(&mut self, position: usize, payload: impl Into<String>) {
        self.edits.push(Edit {
            position,
            kind: EditKind::InsertBefore,
            payload: payload.into(),
        });
    }

    /// Plan the replacement of lines `start..end`.
    pub fn replace(&mut self, start: usize, end: usize, payload: impl Into<String>) {
        self.edits.push(Edit {
            position: start,
            kind: EditKind::Replace { end },
            payload: payload.into(),
        });
    }

    /// Number of planned edits.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Check if nothing is planned.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply the plan to lines that keep their terminators.
    ///
    /// Edits are sorted by position, highest first, and folded from the end
    /// of the snapshot towards its start. Several insertions at one
    /// position end up in reverse planning order: the last planned is the
    /// topmost. An insertion inside a replaced range moves to the start of
    /// that range, above the replacement. Overlapping replacements are
    /// clipped to the lines not yet consumed.
    pub fn apply(mut self, lines: &[&str]) -> String {
        if self.edits.is_empty() {
            return lines.concat();
        }

        let replaced: Vec<(usize, usize)> = self
            .edits
            .iter()
            .filter_map(|e| match e.kind {
                EditKind::Replace { end } => Some((e.position, end)),
                EditKind::InsertBefore => None,
            })
            .collect();
        for edit in &mut self.edits {
            if edit.kind != EditKind::InsertBefore {
                continue;
            }
            let position = edit.position;
            if let Some(&(start, _)) = replaced
                .iter()
                .find(|&&(start, end)| start < position && position < end)
            {
                edit.position = start;
            }
        }

        self.edits.sort_by(|a, b| {
            b.position
                .cmp(&a.position)
                .then(a.kind.order().cmp(&b.kind.order()))
        });

        // Appending after an unterminated last line needs a line break first.
        let appends = self.edits.iter().any(|e| e.position >= lines.len());
        let terminated_last = match lines.last() {
            Some(last) if appends && !last.ends_with('\n') => Some(format!("{}\n", last)),
            _ => None,
        };
        let mut snapshot: Vec<&str> = lines.to_vec();
        if let (Some(fixed), Some(slot)) = (&terminated_last, snapshot.last_mut()) {
            *slot = fixed.as_str();
        }

        let mut chunks: Vec<&str> = Vec::with_capacity(snapshot.len() + self.edits.len());
        let mut cursor = snapshot.len();
        for edit in &self.edits {
            let position = edit.position.min(cursor);
            let end = match edit.kind {
                EditKind::Replace { end } => end.clamp(position, cursor),
                EditKind::InsertBefore => position,
            };
            while cursor > end {
                cursor -= 1;
                chunks.push(snapshot[cursor]);
            }
            chunks.push(&edit.payload);
            cursor = position;
        }
        while cursor > 0 {
            cursor -= 1;
            chunks.push(snapshot[cursor]);
        }

        chunks.reverse();
        chunks.concat()
    }
}
