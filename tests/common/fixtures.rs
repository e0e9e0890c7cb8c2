use std::path::{Path, PathBuf};

/// A fresh, empty directory unique to `test_name` and this process.
pub fn temp_dir(test_name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("lab_ngin_{}_{}", test_name, std::process::id()));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).expect("failed to clear fixture dir");
    }
    std::fs::create_dir_all(&dir).expect("failed to create fixture dir");
    dir
}

pub fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("failed to write fixture");
    path
}

/// A solid-colour PNG.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32, rgba: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    image::RgbaImage::from_pixel(width, height, image::Rgba(rgba))
        .save(&path)
        .expect("failed to write png fixture");
    path
}

/// Unit quad in the XY plane: 4 vertices, 2 triangles.
pub const QUAD_OBJ: &str = "\
# quad
v -1.0 -1.0 0.0
v 1.0 -1.0 0.0
v 1.0 1.0 0.0
v -1.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/4/1
";

/// Two material groups that both use `shared.png`.
pub const TWO_MATERIAL_OBJ: &str = "\
mtllib two.mtl
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
v 0.0 0.0 1.0
v 1.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
usemtl red
f 1/1 2/2 3/3
f 1/1 3/3 4/4
usemtl blue
f 1/1 2/2 6/3
f 1/1 6/3 5/4
";

pub const TWO_MATERIAL_MTL: &str = "\
newmtl red
Kd 1.0 0.0 0.0
map_Kd shared.png

newmtl blue
Kd 0.0 0.0 1.0
map_Kd shared.png
";
