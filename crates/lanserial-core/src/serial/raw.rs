//! Raw-mode terminal attributes.

use nix::sys::termios::{
    ControlFlags, InputFlags, LocalFlags, OutputFlags, SpecialCharacterIndices, Termios,
    cfsetospeed,
};

use crate::config::OPERATING_BAUD;

/// Turn `attrs` into the bridge's raw, 8-bit, RTS/CTS operating point.
///
/// Canonical input, echo, signal characters and extended processing are
/// off; input CR/NL translation, parity checking, stripping, XON/XOFF and
/// break handling are off; output post-processing is off. Reads return as
/// soon as one byte is available.
pub fn make_raw(attrs: &mut Termios) -> nix::Result<()> {
    attrs.local_flags.remove(
        LocalFlags::ICANON | LocalFlags::IEXTEN | LocalFlags::ISIG | LocalFlags::ECHO,
    );
    attrs.input_flags.remove(
        InputFlags::ICRNL
            | InputFlags::INPCK
            | InputFlags::ISTRIP
            | InputFlags::IXON
            | InputFlags::BRKINT,
    );
    attrs.output_flags.remove(OutputFlags::OPOST);
    attrs.control_flags.remove(ControlFlags::CSIZE);
    attrs
        .control_flags
        .insert(ControlFlags::CS8 | ControlFlags::CRTSCTS);
    attrs.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
    attrs.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
    cfsetospeed(attrs, OPERATING_BAUD)
}
