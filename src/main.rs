use std::fs;

use anyhow::Context;

use font::FontFile;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);

    let path = args.next().context("usage: font <font-file> [afm-file]")?;
    let afm_path = args.next();

    let data = fs::read(&path).with_context(|| format!("reading {}", path))?;

    let mut font = FontFile::load(&data).with_context(|| format!("parsing {}", path))?;

    println!("format: {}", font.format_name());
    println!("glyphs: {}", font.num_glyphs());

    if let FontFile::Type1(face) = &mut font {
        println!("font name: {}", face.font_name);

        if let Some(afm_path) = afm_path {
            let afm = fs::read(&afm_path).with_context(|| format!("reading {}", afm_path))?;
            face.attach_metrics(&afm)
                .with_context(|| format!("parsing {}", afm_path))?;

            if let Some(kerning) = face.kerning() {
                println!("kerning pairs: {}", kerning.num_pairs());
            }
        }
    }

    let mut mapped = 0u32;
    let mut preview = Vec::new();
    let mut code = 0;

    loop {
        let (next, gindex) = font.char_next(code);
        if gindex == 0 {
            break;
        }

        mapped += 1;
        if preview.len() < 10 {
            preview.push((next, gindex));
        }
        code = next;
    }

    println!("mapped chars: {}", mapped);
    for (code, gindex) in preview {
        println!("  U+{:04X} -> glyph {}", code, gindex);
    }

    Ok(())
}
