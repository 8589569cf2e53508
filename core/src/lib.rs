#[cfg(feature = "io_ext")]
pub mod io_ext;

/// Copies a byte string into a fixed-width, NUL-padded field.
/// Input longer than the field is truncated.
pub fn pad_bytes<const N: usize>(s: &[u8]) -> [u8; N] {
	let mut field = [0; N];
	let len = s.len().min(N);
	field[..len].copy_from_slice(&s[..len]);
	field
}

/// Returns the part of a fixed-width field before the first NUL byte
pub fn trim_nul(field: &[u8]) -> &[u8] {
	match field.iter().position(|&b| b == 0) {
		Some(end) => &field[..end],
		None => field,
	}
}
