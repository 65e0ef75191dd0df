/// Logical joypad inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl Button {
    /// Bit within its nibble (gbdev.io/pandocs/Joypad_Input.html).
    const fn mask(self) -> u8 {
        match self {
            Button::Right | Button::A => 0x01,
            Button::Left | Button::B => 0x02,
            Button::Up | Button::Select => 0x04,
            Button::Down | Button::Start => 0x08,
        }
    }

    const fn is_direction(self) -> bool {
        matches!(
            self,
            Button::Right | Button::Left | Button::Up | Button::Down
        )
    }
}

/// Button state as two active-low nibbles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Input {
    dpad: u8,
    buttons: u8,
}

impl Input {
    pub fn new() -> Self {
        Self {
            dpad: 0x0F,
            buttons: 0x0F,
        }
    }

    /// Update one button. Returns true if its state actually changed.
    pub fn set_pressed(&mut self, button: Button, pressed: bool) -> bool {
        let nibble = if button.is_direction() {
            &mut self.dpad
        } else {
            &mut self.buttons
        };
        let before = *nibble;
        if pressed {
            *nibble &= !button.mask();
        } else {
            *nibble |= button.mask();
        }
        *nibble != before
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        let nibble = if button.is_direction() {
            self.dpad
        } else {
            self.buttons
        };
        nibble & button.mask() == 0
    }

    /// Compose the P1 value for the select bits last written to 0xFF00.
    /// A cleared bit 4 selects the D-pad, a cleared bit 5 the buttons.
    pub fn read(&self, p1: u8) -> u8 {
        let mut low = 0x0F;
        if p1 & 0x10 == 0 {
            low &= self.dpad;
        }
        if p1 & 0x20 == 0 {
            low &= self.buttons;
        }
        0xC0 | (p1 & 0x30) | low
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}
