//! Minimal Telnet handling for the console.
//!
//! The portal only negotiates ECHO, so the client stops echoing while a
//! password is typed. Any other command the client sends is dropped from
//! the input.

/// Telnet command bytes (IAC = Interpret As Command).
pub mod iac {
    pub const IAC: u8 = 255;
    pub const WILL: u8 = 251;
    pub const WONT: u8 = 252;
    pub const DO: u8 = 253;
    pub const DONT: u8 = 254;
    /// Subnegotiation Begin
    pub const SB: u8 = 250;
    /// Subnegotiation End
    pub const SE: u8 = 240;
}

/// ECHO option code.
pub const ECHO: u8 = 1;

/// Bytes that hand echo over to the server, which then echoes nothing.
/// Sent before the password prompt.
pub fn suppress_echo() -> [u8; 3] {
    [iac::IAC, iac::WILL, ECHO]
}

/// Bytes that give echo back to the client.
pub fn restore_echo() -> [u8; 3] {
    [iac::IAC, iac::WONT, ECHO]
}

/// Remove Telnet commands from one line of input.
///
/// `IAC IAC` stands for a literal 255. Option negotiation takes three bytes,
/// a subnegotiation runs up to `IAC SE`, any other command takes two.
pub fn strip_commands(input: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(input.len());
    let mut bytes = input.iter().copied();

    while let Some(byte) = bytes.next() {
        if byte != iac::IAC {
            data.push(byte);
            continue;
        }
        match bytes.next() {
            Some(iac::IAC) => data.push(iac::IAC),
            Some(iac::WILL | iac::WONT | iac::DO | iac::DONT) => {
                bytes.next();
            }
            Some(iac::SB) => {
                let mut prev = 0;
                for b in bytes.by_ref() {
                    if prev == iac::IAC && b == iac::SE {
                        break;
                    }
                    prev = b;
                }
            }
            _ => {}
        }
    }

    data
}
