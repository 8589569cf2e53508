use byteorder::{
	LE,
	ReadBytesExt,
	WriteBytesExt
};

use log::debug;

use rgk_core::io_ext::{
	ReadBinExt,
	WriteBinExt
};

use ultraviolet::vec::{
	Vec3,
	Vec4
};

use crate::vmd::{
	decode_name,
	encode_name,
	Section,
	VMDError
};

/// Size of the count that prefixes every section
pub const COUNT_SIZE: usize = 4;

/// A record kind stored in one of the count-prefixed VMD sections
pub trait Keyframe: Sized {
	/// Section the records live in
	const SECTION: Section;
	/// Smallest encoded size of a single record
	const SIZE: usize;

	fn frame(&self) -> u32;

	/// Encoded size of this record
	fn encoded_len(&self) -> usize {
		Self::SIZE
	}

	#[cfg(feature = "import")]
	fn read(buf: &mut &[u8]) -> Result<Self, VMDError>;

	#[cfg(feature = "export")]
	fn write<W>(&self, buf: &mut W) -> Result<(), VMDError>
	where
		W: WriteBytesExt;
}

/// Bone pose at a given frame (111 bytes)
#[derive(Clone, Debug, PartialEq)]
pub struct BoneKeyframe {
	pub name: [u8; 15],
	pub frame: u32,
	pub position: Vec3,
	/// Quaternion as x, y, z, w
	pub rotation: Vec4,
	pub interpolation: [u8; 64],
}

impl BoneKeyframe {
	/// Keyframe at rest: no translation, identity rotation
	pub fn new(name: &str, frame: u32) -> BoneKeyframe {
		BoneKeyframe {
			name: encode_name(name),
			frame: frame,
			position: Vec3::zero(),
			rotation: Vec4::new(0.0, 0.0, 0.0, 1.0),
			interpolation: [0; 64],
		}
	}

	pub fn name_str(&self) -> String {
		decode_name(&self.name)
	}
}

impl Keyframe for BoneKeyframe {
	const SECTION: Section = Section::Bone;
	const SIZE: usize = 111;

	fn frame(&self) -> u32 {
		self.frame
	}

	#[cfg(feature = "import")]
	fn read(buf: &mut &[u8]) -> Result<Self, VMDError> {
		Ok(BoneKeyframe {
			name: buf.read_bytes()?,
			frame: buf.read_u32::<LE>()?,
			position: buf.read_vec3_le()?,
			rotation: buf.read_vec4_le()?,
			interpolation: buf.read_bytes()?,
		})
	}

	#[cfg(feature = "export")]
	fn write<W>(&self, buf: &mut W) -> Result<(), VMDError>
	where
		W: WriteBytesExt,
	{
		buf.write_all(&self.name)?;
		buf.write_u32::<LE>(self.frame)?;
		buf.write_vec3_le(self.position)?;
		buf.write_vec4_le(self.rotation)?;
		buf.write_all(&self.interpolation)?;
		Ok(())
	}
}

/// Morph weight at a given frame (23 bytes)
#[derive(Clone, Debug, PartialEq)]
pub struct MorphKeyframe {
	pub name: [u8; 15],
	pub frame: u32,
	/// Nominally 0-1
	pub weight: f32,
}

impl MorphKeyframe {
	pub fn new(name: &str, frame: u32, weight: f32) -> MorphKeyframe {
		MorphKeyframe {
			name: encode_name(name),
			frame: frame,
			weight: weight,
		}
	}

	pub fn name_str(&self) -> String {
		decode_name(&self.name)
	}
}

impl Keyframe for MorphKeyframe {
	const SECTION: Section = Section::Morph;
	const SIZE: usize = 23;

	fn frame(&self) -> u32 {
		self.frame
	}

	#[cfg(feature = "import")]
	fn read(buf: &mut &[u8]) -> Result<Self, VMDError> {
		Ok(MorphKeyframe {
			name: buf.read_bytes()?,
			frame: buf.read_u32::<LE>()?,
			weight: buf.read_f32::<LE>()?,
		})
	}

	#[cfg(feature = "export")]
	fn write<W>(&self, buf: &mut W) -> Result<(), VMDError>
	where
		W: WriteBytesExt,
	{
		buf.write_all(&self.name)?;
		buf.write_u32::<LE>(self.frame)?;
		buf.write_f32::<LE>(self.weight)?;
		Ok(())
	}
}

/// Camera placement at a given frame (61 bytes)
#[derive(Clone, Debug, PartialEq)]
pub struct CameraKeyframe {
	pub frame: u32,
	/// Distance to the target, negative when the target is in front of the camera
	pub distance: f32,
	pub target: Vec3,
	/// Euler angles in radians
	pub rotation: Vec3,
	pub interpolation: [u8; 24],
	/// Field of view in degrees
	pub view_angle: u32,
	/// 0 = perspective on, 1 = off
	pub perspective: u8,
}

impl CameraKeyframe {
	pub fn new(frame: u32) -> CameraKeyframe {
		CameraKeyframe {
			frame: frame,
			distance: 0.0,
			target: Vec3::zero(),
			rotation: Vec3::zero(),
			interpolation: [0; 24],
			view_angle: 30,
			perspective: 0,
		}
	}

	pub fn is_perspective(&self) -> bool {
		self.perspective == 0
	}
}

impl Keyframe for CameraKeyframe {
	const SECTION: Section = Section::Camera;
	const SIZE: usize = 61;

	fn frame(&self) -> u32 {
		self.frame
	}

	#[cfg(feature = "import")]
	fn read(buf: &mut &[u8]) -> Result<Self, VMDError> {
		Ok(CameraKeyframe {
			frame: buf.read_u32::<LE>()?,
			distance: buf.read_f32::<LE>()?,
			target: buf.read_vec3_le()?,
			rotation: buf.read_vec3_le()?,
			interpolation: buf.read_bytes()?,
			view_angle: buf.read_u32::<LE>()?,
			perspective: buf.read_u8()?,
		})
	}

	#[cfg(feature = "export")]
	fn write<W>(&self, buf: &mut W) -> Result<(), VMDError>
	where
		W: WriteBytesExt,
	{
		buf.write_u32::<LE>(self.frame)?;
		buf.write_f32::<LE>(self.distance)?;
		buf.write_vec3_le(self.target)?;
		buf.write_vec3_le(self.rotation)?;
		buf.write_all(&self.interpolation)?;
		buf.write_u32::<LE>(self.view_angle)?;
		buf.write_u8(self.perspective)?;
		Ok(())
	}
}

/// Light color and direction at a given frame (28 bytes)
#[derive(Clone, Debug, PartialEq)]
pub struct LightKeyframe {
	pub frame: u32,
	/// RGB, each channel being the editor value divided by 256
	pub color: Vec3,
	pub position: Vec3,
}

impl LightKeyframe {
	pub fn new(frame: u32, color: Vec3, position: Vec3) -> LightKeyframe {
		LightKeyframe {
			frame: frame,
			color: color,
			position: position,
		}
	}
}

impl Keyframe for LightKeyframe {
	const SECTION: Section = Section::Light;
	const SIZE: usize = 28;

	fn frame(&self) -> u32 {
		self.frame
	}

	#[cfg(feature = "import")]
	fn read(buf: &mut &[u8]) -> Result<Self, VMDError> {
		Ok(LightKeyframe {
			frame: buf.read_u32::<LE>()?,
			color: buf.read_vec3_le()?,
			position: buf.read_vec3_le()?,
		})
	}

	#[cfg(feature = "export")]
	fn write<W>(&self, buf: &mut W) -> Result<(), VMDError>
	where
		W: WriteBytesExt,
	{
		buf.write_u32::<LE>(self.frame)?;
		buf.write_vec3_le(self.color)?;
		buf.write_vec3_le(self.position)?;
		Ok(())
	}
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[repr(u8)]
pub enum ShadowMode {
	Off = 0,
	Mode1,
	Mode2,
}

/// Self-shadow settings at a given frame (9 bytes)
#[derive(Clone, Debug, PartialEq)]
pub struct ShadowKeyframe {
	pub frame: u32,
	pub mode: u8,
	/// Editor distance L stored as (10000 - L) / 100000
	pub distance: f32,
}

impl ShadowKeyframe {
	pub fn new(frame: u32, mode: ShadowMode, distance: f32) -> ShadowKeyframe {
		ShadowKeyframe {
			frame: frame,
			mode: mode as u8,
			distance: distance,
		}
	}

	/// `None` for mode bytes this library doesn't know
	pub fn shadow_mode(&self) -> Option<ShadowMode> {
		match self.mode {
			0 => Some(ShadowMode::Off),
			1 => Some(ShadowMode::Mode1),
			2 => Some(ShadowMode::Mode2),
			_ => None,
		}
	}
}

impl Keyframe for ShadowKeyframe {
	const SECTION: Section = Section::Shadow;
	const SIZE: usize = 9;

	fn frame(&self) -> u32 {
		self.frame
	}

	#[cfg(feature = "import")]
	fn read(buf: &mut &[u8]) -> Result<Self, VMDError> {
		Ok(ShadowKeyframe {
			frame: buf.read_u32::<LE>()?,
			mode: buf.read_u8()?,
			distance: buf.read_f32::<LE>()?,
		})
	}

	#[cfg(feature = "export")]
	fn write<W>(&self, buf: &mut W) -> Result<(), VMDError>
	where
		W: WriteBytesExt,
	{
		buf.write_u32::<LE>(self.frame)?;
		buf.write_u8(self.mode)?;
		buf.write_f32::<LE>(self.distance)?;
		Ok(())
	}
}

/// IK enable state for one bone
#[derive(Clone, Debug, PartialEq)]
pub struct IKToggle {
	pub name: [u8; 20],
	pub enabled: u8,
}

impl IKToggle {
	pub const SIZE: usize = 21;

	pub fn new(name: &str, enabled: bool) -> IKToggle {
		IKToggle {
			name: encode_name(name),
			enabled: enabled as u8,
		}
	}

	pub fn name_str(&self) -> String {
		decode_name(&self.name)
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled != 0
	}
}

/// Model visibility and IK toggles at a given frame (9 + 21 * IK count bytes)
#[derive(Clone, Debug, PartialEq)]
pub struct ShowIKKeyframe {
	pub frame: u32,
	pub show: u8,
	pub iks: Vec<IKToggle>,
}

impl ShowIKKeyframe {
	pub fn new(frame: u32, show: bool, iks: Vec<IKToggle>) -> ShowIKKeyframe {
		ShowIKKeyframe {
			frame: frame,
			show: show as u8,
			iks: iks,
		}
	}

	pub fn is_visible(&self) -> bool {
		self.show != 0
	}
}

impl Keyframe for ShowIKKeyframe {
	const SECTION: Section = Section::ShowIK;
	const SIZE: usize = 9;

	fn frame(&self) -> u32 {
		self.frame
	}

	fn encoded_len(&self) -> usize {
		Self::SIZE + self.iks.len() * IKToggle::SIZE
	}

	#[cfg(feature = "import")]
	fn read(buf: &mut &[u8]) -> Result<Self, VMDError> {
		let frame = buf.read_u32::<LE>()?;
		let show = buf.read_u8()?;
		let ik_count = buf.read_u32::<LE>()? as usize;

		let needed = ik_count.checked_mul(IKToggle::SIZE).unwrap_or(usize::MAX);
		if needed > buf.len() {
			return Err(VMDError::Truncated {
				section: Section::ShowIK,
				needed: needed,
				remaining: buf.len(),
			});
		}

		let mut iks = Vec::new();
		iks.try_reserve_exact(ik_count)?;

		for _ in 0..ik_count {
			iks.push(IKToggle {
				name: buf.read_bytes()?,
				enabled: buf.read_u8()?,
			});
		}

		Ok(ShowIKKeyframe {
			frame: frame,
			show: show,
			iks: iks,
		})
	}

	#[cfg(feature = "export")]
	fn write<W>(&self, buf: &mut W) -> Result<(), VMDError>
	where
		W: WriteBytesExt,
	{
		let ik_count = count_u32(Section::ShowIK, self.iks.len())?;

		buf.write_u32::<LE>(self.frame)?;
		buf.write_u8(self.show)?;
		buf.write_u32::<LE>(ik_count)?;

		for ik in self.iks.iter() {
			buf.write_all(&ik.name)?;
			buf.write_u8(ik.enabled)?;
		}

		Ok(())
	}
}

/// Reads one count-prefixed section.
///
/// Returns `None` when the input is already exhausted, which is how older
/// revisions of the format leave out their trailing sections.
#[cfg(feature = "import")]
pub fn read_section<K>(buf: &mut &[u8]) -> Result<Option<Vec<K>>, VMDError>
where
	K: Keyframe,
{
	if buf.is_empty() {
		debug!("No {} section present", K::SECTION);
		return Ok(None);
	}

	if buf.len() < COUNT_SIZE {
		return Err(VMDError::Truncated {
			section: K::SECTION,
			needed: COUNT_SIZE,
			remaining: buf.len(),
		});
	}

	let count = buf.read_u32::<LE>()? as usize;

	// Checked before allocating so a bogus count can't reserve gigabytes
	let needed = count.checked_mul(K::SIZE).unwrap_or(usize::MAX);
	if needed > buf.len() {
		return Err(VMDError::Truncated {
			section: K::SECTION,
			needed: needed,
			remaining: buf.len(),
		});
	}

	let mut records = Vec::new();
	records.try_reserve_exact(count)?;

	for _ in 0..count {
		// variable sized records may have used up the bytes the count check assumed
		if buf.len() < K::SIZE {
			return Err(VMDError::Truncated {
				section: K::SECTION,
				needed: K::SIZE,
				remaining: buf.len(),
			});
		}

		records.push(K::read(buf)?);
	}

	debug!("Read {} {} keyframes", count, K::SECTION);

	Ok(Some(records))
}

/// Narrows an encoded list length to the format's 32-bit count
#[cfg(feature = "export")]
fn count_u32(section: Section, len: usize) -> Result<u32, VMDError> {
	u32::try_from(len).map_err(|_| VMDError::Count {
		section: section,
		len: len,
	})
}

/// Writes one count-prefixed section. Empty sections still get their count.
#[cfg(feature = "export")]
pub fn write_section<K, W>(records: &[K], buf: &mut W) -> Result<(), VMDError>
where
	K: Keyframe,
	W: WriteBytesExt,
{
	let count = count_u32(K::SECTION, records.len())?;

	buf.write_u32::<LE>(count)?;

	for rec in records.iter() {
		rec.write(buf)?;
	}

	Ok(())
}

/// Encoded size of a section, count included
pub fn section_len<K>(records: &[K]) -> usize
where
	K: Keyframe,
{
	COUNT_SIZE + records.iter().map(K::encoded_len).sum::<usize>()
}

/// Sorts records by ascending frame number, keeping ties in their current order
pub fn sort_frames<K>(records: &mut [K])
where
	K: Keyframe,
{
	records.sort_by_key(K::frame);
}
