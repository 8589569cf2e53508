use byteorder::WriteBytesExt;
use encoding_rs::SHIFT_JIS;
use log::{
	debug,
	warn
};

use std::{
	collections::TryReserveError,
	fmt::{
		Display,
		Formatter,
		self
	},
	fs,
	io,
	path::Path
};

use thiserror::Error;

use rgk_core::{
	io_ext::ReadBinExt,
	pad_bytes,
	trim_nul
};

pub use crate::vmd_frames::{
	BoneKeyframe,
	CameraKeyframe,
	IKToggle,
	Keyframe,
	LightKeyframe,
	MorphKeyframe,
	ShadowKeyframe,
	ShadowMode,
	ShowIKKeyframe
};

use crate::vmd_frames::{
	section_len,
	sort_frames
};

#[cfg(feature = "import")]
use crate::vmd_frames::read_section;

#[cfg(feature = "export")]
use crate::vmd_frames::write_section;

/// Signature of the current format revision, NUL padded
pub const MAGIC: [u8; 30] = *b"Vocaloid Motion Data 0002\0\0\0\0\0";
pub const HEADER_SIZE: usize = 50;

/// Regions of a motion file, in the order they are stored
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Section {
	Header,
	Bone,
	Morph,
	Camera,
	Light,
	Shadow,
	ShowIK,
}

impl Section {
	/// The keyframe sections, without the header
	pub const ALL: [Section; 6] = [Section::Bone, Section::Morph, Section::Camera, Section::Light,
		Section::Shadow, Section::ShowIK];

	/// Short label used by the summary
	pub fn label(&self) -> &'static str {
		match self {
			Section::Header => "Header",
			Section::Bone => "Bone",
			Section::Morph => "Morph",
			Section::Camera => "Camera",
			Section::Light => "Light",
			Section::Shadow => "Shadow",
			Section::ShowIK => "IK",
		}
	}
}

impl Display for Section {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Section::ShowIK => write!(f, "show/IK"),
			_ => write!(f, "{}", self.label().to_lowercase()),
		}
	}
}

#[derive(Error, Debug)]
pub enum VMDError {
	#[error("Memory allocation failed")]
	Allocation {
		#[from]
		source: TryReserveError,
	},
	#[error("Too many {section} keyframes to encode: {len}")]
	Count {
		section: Section,
		len: usize,
	},
	#[error("I/O error")]
	IO {
		#[from]
		source: io::Error,
	},
	#[error("Not a VMD file: {}", String::from_utf8_lossy(trim_nul(.0)))]
	Magic([u8; 30]),
	#[error("Truncated {section} section: {needed} bytes needed, {remaining} remaining")]
	Truncated {
		section: Section,
		needed: usize,
		remaining: usize,
	},
}

/// Decodes a fixed-width Shift_JIS name field up to its first NUL
pub fn decode_name(field: &[u8]) -> String {
	let (text, _) = SHIFT_JIS.decode_without_bom_handling(trim_nul(field));
	text.into_owned()
}

/// Encodes text as Shift_JIS into a NUL padded field, truncating if needed
pub fn encode_name<const N: usize>(name: &str) -> [u8; N] {
	let (raw, _, _) = SHIFT_JIS.encode(name);
	pad_bytes(&raw)
}

/// Compares the leading bytes of `data` against [`MAGIC`]
pub fn check_magic(data: &[u8]) -> bool {
	data.len() >= MAGIC.len() && data[..MAGIC.len()] == MAGIC
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Header {
	pub magic: [u8; 30],
	/// Not necessarily NUL padded past its terminator
	pub model_name: [u8; 20],
}

impl Header {
	pub fn new(model_name: &str) -> Header {
		Header {
			magic: MAGIC,
			model_name: encode_name(model_name),
		}
	}

	pub fn model_name_str(&self) -> String {
		decode_name(&self.model_name)
	}

	#[cfg(feature = "import")]
	fn read(buf: &mut &[u8]) -> Result<Header, VMDError> {
		Ok(Header {
			magic: buf.read_bytes()?,
			model_name: buf.read_bytes()?,
		})
	}

	#[cfg(feature = "export")]
	fn write<W>(&self, buf: &mut W) -> io::Result<()>
	where
		W: WriteBytesExt,
	{
		buf.write_all(&self.magic)?;
		buf.write_all(&self.model_name)
	}
}

/// A whole motion file: header plus its six keyframe sections
#[derive(Clone, Debug, PartialEq)]
pub struct VMDMotion {
	pub header: Header,
	pub bones: Vec<BoneKeyframe>,
	pub morphs: Vec<MorphKeyframe>,
	pub cameras: Vec<CameraKeyframe>,
	pub lights: Vec<LightKeyframe>,
	pub shadows: Vec<ShadowKeyframe>,
	pub show_iks: Vec<ShowIKKeyframe>,
}

impl VMDMotion {
	/// Creates a motion without any keyframes
	pub fn new(model_name: &str) -> VMDMotion {
		VMDMotion::with_header(Header::new(model_name))
	}

	pub fn with_header(header: Header) -> VMDMotion {
		VMDMotion {
			header: header,
			bones: vec![],
			morphs: vec![],
			cameras: vec![],
			lights: vec![],
			shadows: vec![],
			show_iks: vec![],
		}
	}

	pub fn header(&self) -> &Header {
		&self.header
	}

	pub fn model_name(&self) -> String {
		self.header.model_name_str()
	}

	pub fn bones(&self) -> &[BoneKeyframe] {
		&self.bones
	}

	pub fn morphs(&self) -> &[MorphKeyframe] {
		&self.morphs
	}

	pub fn cameras(&self) -> &[CameraKeyframe] {
		&self.cameras
	}

	pub fn lights(&self) -> &[LightKeyframe] {
		&self.lights
	}

	pub fn shadows(&self) -> &[ShadowKeyframe] {
		&self.shadows
	}

	pub fn show_iks(&self) -> &[ShowIKKeyframe] {
		&self.show_iks
	}

	/// Number of keyframes in a section
	pub fn count(&self, section: Section) -> usize {
		match section {
			Section::Header => 0,
			Section::Bone => self.bones.len(),
			Section::Morph => self.morphs.len(),
			Section::Camera => self.cameras.len(),
			Section::Light => self.lights.len(),
			Section::Shadow => self.shadows.len(),
			Section::ShowIK => self.show_iks.len(),
		}
	}

	/// Keyframe counts for every section, in file order
	pub fn section_counts(&self) -> [(Section, usize); 6] {
		Section::ALL.map(|s| (s, self.count(s)))
	}

	/// Size of the encoded file, every section included
	pub fn encoded_len(&self) -> usize {
		HEADER_SIZE + section_len(&self.bones) + section_len(&self.morphs) +
			section_len(&self.cameras) + section_len(&self.lights) + section_len(&self.shadows) +
			section_len(&self.show_iks)
	}

	/// Sorts every section by ascending frame number.
	/// Keyframes sharing a frame number keep their relative order.
	pub fn sort_all(&mut self) {
		sort_frames(&mut self.bones);
		sort_frames(&mut self.morphs);
		sort_frames(&mut self.cameras);
		sort_frames(&mut self.lights);
		sort_frames(&mut self.shadows);
		sort_frames(&mut self.show_iks);
	}

	/// Decodes a complete motion file.
	///
	/// Files may end after any section; the sections that follow are left empty.
	#[cfg(feature = "import")]
	pub fn read(data: &[u8]) -> Result<VMDMotion, VMDError> {
		if data.len() < HEADER_SIZE {
			let avail = data.len().min(MAGIC.len());
			if data[..avail] != MAGIC[..avail] {
				return Err(VMDError::Magic(pad_bytes(&data[..avail])));
			}

			return Err(VMDError::Truncated {
				section: Section::Header,
				needed: HEADER_SIZE,
				remaining: data.len(),
			});
		}

		if !check_magic(data) {
			return Err(VMDError::Magic(pad_bytes(&data[..MAGIC.len()])));
		}

		let mut buf = data;
		let mut motion = VMDMotion::with_header(Header::read(&mut buf)?);

		macro_rules! next_section {
			($field: ident) => {
				match read_section(&mut buf)? {
					Some(records) => motion.$field = records,
					None => return Ok(motion),
				}
			}
		}

		next_section!(bones);
		next_section!(morphs);
		next_section!(cameras);
		next_section!(lights);
		next_section!(shadows);
		next_section!(show_iks);

		if !buf.is_empty() {
			warn!("Ignoring {} bytes after the {} section", buf.len(), Section::ShowIK);
		}

		Ok(motion)
	}

	/// Reads and decodes a motion file from disk
	#[cfg(feature = "import")]
	pub fn open<P>(path: P) -> Result<VMDMotion, VMDError>
	where
		P: AsRef<Path>,
	{
		let data = fs::read(path.as_ref())?;
		debug!("Read {} bytes from {}", data.len(), path.as_ref().display());
		VMDMotion::read(&data)
	}

	/// Encodes the motion. All six sections are always written, empty or not.
	#[cfg(feature = "export")]
	pub fn write<W>(&self, buf: &mut W) -> Result<(), VMDError>
	where
		W: WriteBytesExt,
	{
		self.header.write(buf)?;
		write_section(&self.bones, buf)?;
		write_section(&self.morphs, buf)?;
		write_section(&self.cameras, buf)?;
		write_section(&self.lights, buf)?;
		write_section(&self.shadows, buf)?;
		write_section(&self.show_iks, buf)
	}

	#[cfg(feature = "export")]
	pub fn to_bytes(&self) -> Result<Vec<u8>, VMDError> {
		let mut out = Vec::new();
		out.try_reserve_exact(self.encoded_len())?;
		self.write(&mut out)?;
		Ok(out)
	}

	/// Encodes the motion and writes it to disk. Nothing is written if encoding fails.
	#[cfg(feature = "export")]
	pub fn save<P>(&self, path: P) -> Result<(), VMDError>
	where
		P: AsRef<Path>,
	{
		let data = self.to_bytes()?;
		fs::write(path.as_ref(), &data)?;
		debug!("Wrote {} bytes to {}", data.len(), path.as_ref().display());
		Ok(())
	}
}

impl Display for VMDMotion {
	/// One line for the model name, then one per section
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		writeln!(f, "[Model    Name]: {}", self.model_name())?;

		for (section, count) in self.section_counts().iter() {
			writeln!(f, "[{:<6} Frames]: {}", section.label(), count)?;
		}

		Ok(())
	}
}
