use std::collections::VecDeque;

/// Maximum number of pending inputs held between two frames.
pub const INPUT_QUEUE_CAPACITY: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Flap,
    Restart,
}

pub fn classify_key(code: &str) -> Option<InputEvent> {
    match code {
        "Space" | "ArrowUp" | "KeyX" => Some(InputEvent::Flap),
        "Enter" => Some(InputEvent::Restart),
        _ => None,
    }
}

/// Touch and click events always flap, wherever they land.
pub fn classify_event_type(event_type: &str) -> Option<InputEvent> {
    match event_type {
        "touchstart" | "click" => Some(InputEvent::Flap),
        _ => None,
    }
}

pub fn input_name(input: InputEvent) -> &'static str {
    match input {
        InputEvent::Flap => "flap",
        InputEvent::Restart => "restart",
    }
}

/// FIFO of inputs received since the last frame. When full, the oldest
/// entry is dropped so the latest player intent always survives.
#[derive(Debug, Default)]
pub struct InputQueue {
    pending: VecDeque<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::with_capacity(INPUT_QUEUE_CAPACITY),
        }
    }

    pub fn push(&mut self, input: InputEvent) {
        if self.pending.len() == INPUT_QUEUE_CAPACITY {
            self.pending.pop_front();
        }
        self.pending.push_back(input);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.pending.drain(..)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
