//! Byte classification for header fields.

macro_rules! byte_table {
    (
        $(#[$meta:meta])*
        $vis:vis const fn $fn_id:ident($byte:ident) { $e:expr }
    ) => {
        $(#[$meta])*
        #[inline(always)]
        $vis const fn $fn_id(byte: u8) -> bool {
            static TABLE: [bool; 256] = {
                let mut table = [false; 256];
                let mut $byte = 0u8;
                loop {
                    table[$byte as usize] = $e;
                    if $byte == 255 {
                        break;
                    }
                    $byte += 1;
                }
                table
            };
            TABLE[byte as usize]
        }
    };
}

byte_table! {
    /// token   = 1*tchar
    /// tchar   = "!" / "#" / "$" / "%" / "&" / "'" / "*"
    ///         / "+" / "-" / "." / "^" / "_" / "`" / "|" / "~"
    ///         / DIGIT / ALPHA
    pub(crate) const fn is_token(byte) {
        matches!(
            byte,
            | b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*'
            | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~'
            | b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z'
        )
    }
}

byte_table! {
    /// field-vchar restricted to ASCII, plus SP and HTAB.
    pub(crate) const fn is_header_value(byte) {
        matches!(byte, b'\t' | b' '..=b'~')
    }
}
