use std::{error::Error, fmt};

use gate_runner_core::Direction;

/// Input replayed by the headless session, one entry per scripted keypress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScriptedInput {
    /// Attempt a move in the given direction.
    Move(Direction),
    /// Ask the session to stop.
    Quit,
}

/// Ordered keypresses parsed from a `wasd` string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct MoveScript {
    inputs: Vec<ScriptedInput>,
    cursor: usize,
}

impl MoveScript {
    /// Parses `value`, where `w`/`a`/`s`/`d` move and `q` quits.
    ///
    /// Whitespace is ignored so long scripts may be grouped for readability.
    pub(crate) fn parse(value: &str) -> Result<Self, ScriptError> {
        let mut inputs = Vec::new();
        for (position, key) in value.chars().enumerate() {
            let input = match key.to_ascii_lowercase() {
                'w' => ScriptedInput::Move(Direction::Up),
                'a' => ScriptedInput::Move(Direction::Left),
                's' => ScriptedInput::Move(Direction::Down),
                'd' => ScriptedInput::Move(Direction::Right),
                'q' => ScriptedInput::Quit,
                key if key.is_whitespace() => continue,
                _ => return Err(ScriptError::UnknownKey { position, key }),
            };
            inputs.push(input);
        }
        Ok(Self { inputs, cursor: 0 })
    }

    /// Number of inputs not yet replayed.
    #[must_use]
    pub(crate) fn remaining(&self) -> usize {
        self.inputs.len().saturating_sub(self.cursor)
    }
}

impl Iterator for MoveScript {
    type Item = ScriptedInput;

    fn next(&mut self) -> Option<Self::Item> {
        let input = self.inputs.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(input)
    }
}

/// Errors that can occur while parsing a move script.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ScriptError {
    /// A character outside the script alphabet was found.
    UnknownKey {
        /// Zero-based character offset of the key.
        position: usize,
        /// The rejected key.
        key: char,
    },
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKey { position, key } => write!(
                f,
                "unknown key '{key}' at position {position}, expected one of w, a, s, d, q"
            ),
        }
    }
}

impl Error for ScriptError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_inputs_in_order() {
        let script = MoveScript::parse("wd s\nAq").expect("script parses");
        let inputs: Vec<_> = script.collect();
        assert_eq!(
            inputs,
            vec![
                ScriptedInput::Move(Direction::Up),
                ScriptedInput::Move(Direction::Right),
                ScriptedInput::Move(Direction::Down),
                ScriptedInput::Move(Direction::Left),
                ScriptedInput::Quit,
            ]
        );
    }

    #[test]
    fn unknown_keys_are_reported_with_position() {
        let error = MoveScript::parse("ddx").expect_err("x is not a key");
        assert_eq!(error, ScriptError::UnknownKey { position: 2, key: 'x' });
        assert_eq!(
            error.to_string(),
            "unknown key 'x' at position 2, expected one of w, a, s, d, q"
        );
    }

    #[test]
    fn remaining_counts_down() {
        let mut script = MoveScript::parse("ww").expect("script parses");
        assert_eq!(script.remaining(), 2);
        let _ = script.next();
        assert_eq!(script.remaining(), 1);
    }
}
