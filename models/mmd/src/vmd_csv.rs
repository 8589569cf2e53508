use std::{
	borrow::Cow,
	io::{
		self,
		Write
	}
};

use crate::vmd::VMDMotion;

/// Quotes a CSV field if it would otherwise break the row
fn field(s: &str) -> Cow<'_, str> {
	if s.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
		Cow::Owned(format!("\"{}\"", s.replace('"', "\"\"")))
	} else {
		Cow::Borrowed(s)
	}
}

impl VMDMotion {
	/// Dumps the bone keyframes as CSV, one row per keyframe in stored order
	pub fn write_bone_csv<W>(&self, out: &mut W) -> io::Result<()>
	where
		W: Write,
	{
		writeln!(out, "name,frame,x,y,z,qx,qy,qz,qw")?;

		for bone in self.bones() {
			let (p, q) = (bone.position, bone.rotation);
			writeln!(out, "{},{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}", field(&bone.name_str()),
				bone.frame, p.x, p.y, p.z, q.x, q.y, q.z, q.w)?;
		}

		Ok(())
	}

	/// Dumps the morph keyframes as CSV, one row per keyframe in stored order
	pub fn write_morph_csv<W>(&self, out: &mut W) -> io::Result<()>
	where
		W: Write,
	{
		writeln!(out, "name,frame,value")?;

		for morph in self.morphs() {
			writeln!(out, "{},{},{:.6}", field(&morph.name_str()), morph.frame, morph.weight)?;
		}

		Ok(())
	}
}
