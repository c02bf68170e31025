//! 页面排版常量与文本度量（A4，毫米坐标，原点在左下角）

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;

pub const MARGIN_LEFT: f32 = 15.0;
pub const CONTENT_RIGHT: f32 = 195.0;

/// 表格正文低于此高度就换页（给页脚留空间）
pub const BOTTOM_LIMIT: f32 = 22.0;
pub const FOOTER_Y: f32 = 12.0;

/// 行项目表列起点；描述列到 X_QTY 之前
pub const X_DESC: f32 = MARGIN_LEFT;
pub const X_QTY: f32 = 110.0;
pub const X_PRICE: f32 = 135.0;
pub const X_SUBTOTAL: f32 = 165.0;

pub const ROW_HEIGHT: f32 = 6.0;
pub const LINE_HEIGHT_SMALL: f32 = 5.0;

pub const FONT_COMPANY: f32 = 16.0;
pub const FONT_TITLE: f32 = 15.0;
pub const FONT_BODY: f32 = 11.0;
pub const FONT_TABLE: f32 = 10.0;
pub const FONT_SMALL: f32 = 9.0;
pub const FONT_FOOTER: f32 = 8.0;

/// 描述列按字符数折行；Helvetica 10pt 下约 52 个字符占满列宽
pub const DESC_WRAP_CHARS: usize = 52;
/// 条款区整行宽度对应的字符数
pub const TERMS_WRAP_CHARS: usize = 98;

/// 参考图最大排版尺寸
pub const REF_IMAGE_MAX_W: f32 = 90.0;
pub const REF_IMAGE_MAX_H: f32 = 100.0;

/// Helvetica 宽度估算：平均字宽约 0.5em（1pt = 0.3528mm）。
/// 只用于右对齐和居中，偏差一两毫米可接受
pub fn approx_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.5 * 0.3528
}

/// 按单词折行，超长单词硬切
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for raw_line in text.lines() {
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };

            if needed <= max_chars {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            // 单词本身超过一行时按字符硬切
            let mut chunk = String::new();
            for c in word.chars() {
                chunk.push(c);
                if chunk.chars().count() == max_chars {
                    lines.push(std::mem::take(&mut chunk));
                }
            }
            current = chunk;
        }
        if !current.is_empty() || raw_line.trim().is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap_text("Mesa de madera", 52), vec!["Mesa de madera"]);
    }

    #[test]
    fn long_text_wraps_at_word_boundaries() {
        let lines = wrap_text("Mesa de madera con acabado en laca y patas torneadas", 20);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.chars().count() <= 20);
        }
        assert_eq!(lines.join(" ").trim(), "Mesa de madera con acabado en laca y patas torneadas");
    }

    #[test]
    fn oversized_word_is_hard_split() {
        let lines = wrap_text("Supercalifragilistico", 8);
        assert!(lines.len() >= 3);
        assert!(lines.iter().all(|l| l.chars().count() <= 8));
    }

    #[test]
    fn empty_text_yields_single_empty_line() {
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }

    #[test]
    fn newlines_are_respected() {
        let lines = wrap_text("línea uno\nlínea dos", 52);
        assert_eq!(lines, vec!["línea uno", "línea dos"]);
    }
}
