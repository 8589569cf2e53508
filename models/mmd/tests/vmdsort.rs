#![cfg(all(feature = "import", feature = "export"))]

use std::fs;

use ultraviolet::vec::Vec3;

use rgk_models_mmd::vmd::{
	BoneKeyframe,
	CameraKeyframe,
	IKToggle,
	LightKeyframe,
	MorphKeyframe,
	Section,
	ShadowKeyframe,
	ShadowMode,
	ShowIKKeyframe,
	VMDError,
	VMDMotion
};

fn dance() -> VMDMotion {
	let mut motion = VMDMotion::new("TestModel");

	for (i, frame) in [90u32, 0, 45, 45, 10].iter().enumerate() {
		let mut bone = BoneKeyframe::new(if i % 2 == 0 { "center" } else { "upper body" }, *frame);
		bone.position = Vec3::new(i as f32, 0.0, 0.0);
		motion.bones.push(bone);
	}

	motion.morphs = vec![MorphKeyframe::new("smile", 20, 0.5), MorphKeyframe::new("smile", 5, 0.0)];
	motion.cameras = vec![CameraKeyframe::new(60), CameraKeyframe::new(0)];
	motion.lights = vec![LightKeyframe::new(0, Vec3::new(0.6, 0.6, 0.6), Vec3::new(-0.5, -1.0, 0.5))];
	motion.shadows = vec![ShadowKeyframe::new(15, ShadowMode::Off, 0.0),
		ShadowKeyframe::new(0, ShadowMode::Mode2, 0.05)];
	motion.show_iks = vec![ShowIKKeyframe::new(30, true, vec![IKToggle::new("leg IK R", false),
		IKToggle::new("leg IK L", false)]), ShowIKKeyframe::new(0, true, vec![])];

	motion
}

#[test]
fn test_save_and_open() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("dance.vmd");

	let motion = dance();
	motion.save(&path).unwrap();

	assert_eq!(motion.encoded_len() as u64, fs::metadata(&path).unwrap().len());
	assert_eq!(motion, VMDMotion::open(&path).unwrap());
}

#[test]
fn test_decode_sort_encode() {
	let dir = tempfile::tempdir().unwrap();
	let input = dir.path().join("input.vmd");
	let output = dir.path().join("output.vmd");
	dance().save(&input).unwrap();

	let mut motion = VMDMotion::open(&input).unwrap();
	motion.sort_all();
	motion.save(&output).unwrap();

	let sorted = VMDMotion::open(&output).unwrap();
	let frames: Vec<u32> = sorted.bones().iter().map(|b| b.frame).collect();
	assert_eq!(vec![0, 10, 45, 45, 90], frames);

	// equal frames stay in file order
	assert_eq!(2.0, sorted.bones()[2].position.x);
	assert_eq!(3.0, sorted.bones()[3].position.x);

	assert_eq!(5, sorted.morphs()[0].frame);
	assert_eq!(0, sorted.cameras()[0].frame);
	assert_eq!(Some(ShadowMode::Mode2), sorted.shadows()[0].shadow_mode());
	assert!(sorted.show_iks()[0].iks.is_empty());
	assert_eq!("leg IK L", sorted.show_iks()[1].iks[1].name_str());

	assert_eq!([(Section::Bone, 5), (Section::Morph, 2), (Section::Camera, 2), (Section::Light, 1),
		(Section::Shadow, 2), (Section::ShowIK, 2)], sorted.section_counts());
}

#[test]
fn test_open_missing_file() {
	let dir = tempfile::tempdir().unwrap();
	assert!(matches!(VMDMotion::open(dir.path().join("missing.vmd")), Err(VMDError::IO { .. })));
}

#[test]
fn test_open_wrong_format() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("model.pmx");
	fs::write(&path, b"PMX \x00\x00\x00\x40 not a motion file at all, just some other data").unwrap();

	assert!(matches!(VMDMotion::open(&path), Err(VMDError::Magic(_))));
}
