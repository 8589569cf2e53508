use std::io::{
	Read,
	Result,
	Write
};

use ultraviolet::vec::{
	Vec3,
	Vec4
};

pub trait ReadBinExt: Read {
	/// Reads a fixed-width byte field, such as a padded name
	#[inline]
	fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N]> {
		let mut field = [0; N];
		self.read_exact(&mut field)?;
		Ok(field)
	}

	/// Reads `N` consecutive little endian floats
	#[inline]
	fn read_f32s_le<const N: usize>(&mut self) -> Result<[f32; N]> {
		let mut out = [0.0; N];
		let mut raw = [0; 4];

		for f in out.iter_mut() {
			self.read_exact(&mut raw)?;
			*f = f32::from_le_bytes(raw);
		}

		Ok(out)
	}

	/// Reads a little endian 3D vector
	#[inline]
	fn read_vec3_le(&mut self) -> Result<Vec3> {
		let [x, y, z] = self.read_f32s_le::<3>()?;
		Ok(Vec3::new(x, y, z))
	}

	/// Reads a little endian 4D vector
	#[inline]
	fn read_vec4_le(&mut self) -> Result<Vec4> {
		let [x, y, z, w] = self.read_f32s_le::<4>()?;
		Ok(Vec4::new(x, y, z, w))
	}
}

impl<R> ReadBinExt for R
where
	R: Read + ?Sized,
{
}

pub trait WriteBinExt: Write {
	/// Writes floats in little endian order
	#[inline]
	fn write_f32s_le(&mut self, floats: &[f32]) -> Result<()> {
		for f in floats {
			self.write_all(&f.to_le_bytes())?;
		}

		Ok(())
	}

	/// Writes a little endian 3D vector
	#[inline]
	fn write_vec3_le(&mut self, v: Vec3) -> Result<()> {
		self.write_f32s_le(&[v.x, v.y, v.z])
	}

	/// Writes a little endian 4D vector
	#[inline]
	fn write_vec4_le(&mut self, v: Vec4) -> Result<()> {
		self.write_f32s_le(&[v.x, v.y, v.z, v.w])
	}
}

impl<W> WriteBinExt for W
where
	W: Write + ?Sized,
{
}
