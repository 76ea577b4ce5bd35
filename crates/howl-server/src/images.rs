//! Animal illustrations served from the static directory

use std::path::Path;

use howl_core::Animal;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// URL of the first `<animal>.jpg|.jpeg|.png` found in `images_dir`.
pub fn find_illustration(images_dir: &Path, animal: Animal) -> Option<String> {
    IMAGE_EXTENSIONS.iter().find_map(|ext| {
        let file_name = format!("{}.{}", animal.name(), ext);
        images_dir
            .join(&file_name)
            .is_file()
            .then(|| format!("/static/images/{}", file_name))
    })
}
