//! PDF 生成：逐页手工排版（printpdf 内置 Helvetica）。
//! 每页重绘页眉；行项目表自动分页；尾部参考图区按剩余高度分页

use super::layout::*;
use super::RenderJob;
use crate::error::AppError;
use crate::quotation::{format_money, LineItem};
use printpdf::image_crate::{self, GenericImageView};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};
use tracing::warn;

struct PdfRenderer<'a> {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    font_italic: IndirectFontRef,
    logo: Option<image_crate::DynamicImage>,
    y: f32,
    page_no: u32,
    job: &'a RenderJob,
}

pub fn generate(job: &RenderJob) -> Result<Vec<u8>, AppError> {
    let (doc, page, layer) = printpdf::PdfDocument::new(
        format!("Cotización {}", job.number),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Capa 1",
    );

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::RenderFailed(e.to_string()))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::RenderFailed(e.to_string()))?;
    let font_italic = doc
        .add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(|e| AppError::RenderFailed(e.to_string()))?;

    // Logo 解码失败时不终止生成，只是不画
    let logo = job.logo_path.as_deref().and_then(|path| {
        match image_crate::open(path) {
            Ok(img) => Some(img),
            Err(e) => {
                warn!("无法解码 logo {}: {}", path, e);
                None
            }
        }
    });

    let layer = doc.get_page(page).get_layer(layer);
    let mut renderer = PdfRenderer {
        doc,
        layer,
        font,
        font_bold,
        font_italic,
        logo,
        y: PAGE_HEIGHT,
        page_no: 1,
        job,
    };

    renderer.draw_page_chrome();
    renderer.draw_meta_block();
    renderer.draw_items_table();
    renderer.draw_totals();
    renderer.draw_terms();
    renderer.draw_references();

    let mut writer = std::io::BufWriter::new(Vec::<u8>::new());
    renderer
        .doc
        .save(&mut writer)
        .map_err(|e| AppError::RenderFailed(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| AppError::RenderFailed(e.to_string()))
}

impl<'a> PdfRenderer<'a> {
    fn text(&self, text: &str, size: f32, font: &IndirectFontRef, x: f32, y: f32) {
        self.layer.use_text(text, size, Mm(x), Mm(y), font);
    }

    fn text_right(&self, text: &str, size: f32, font: &IndirectFontRef, right: f32, y: f32) {
        let x = right - approx_text_width(text, size);
        self.text(text, size, font, x, y);
    }

    fn text_centered(&self, text: &str, size: f32, font: &IndirectFontRef, y: f32) {
        let x = (PAGE_WIDTH - approx_text_width(text, size)) / 2.0;
        self.text(text, size, font, x, y);
    }

    fn rule(&self, y: f32) {
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(0.78, 0.78, 0.78, None)));
        self.layer.set_outline_thickness(0.4);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN_LEFT), Mm(y)), false),
                (Point::new(Mm(CONTENT_RIGHT), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    fn money(&self, value: f64) -> String {
        format!("{} {}", self.job.currency.symbol(), format_money(value))
    }

    /// 页眉（logo、公司信息、标题）+ 页脚页码；光标落到正文起点
    fn draw_page_chrome(&mut self) {
        if let Some(logo) = &self.logo {
            let (w, h) = logo.dimensions();
            let natural_w = w as f32 * 25.4 / 300.0;
            let natural_h = h as f32 * 25.4 / 300.0;
            let scale = (30.0 / natural_w).min(18.0 / natural_h);
            Image::from_dynamic_image(logo).add_to_layer(
                self.layer.clone(),
                ImageTransform {
                    translate_x: Some(Mm(MARGIN_LEFT)),
                    translate_y: Some(Mm(PAGE_HEIGHT - 10.0 - natural_h * scale)),
                    scale_x: Some(scale),
                    scale_y: Some(scale),
                    ..ImageTransform::default()
                },
            );
        }

        let company = &self.job.company;
        self.text(&company.name, FONT_COMPANY, &self.font_bold.clone(), 50.0, PAGE_HEIGHT - 16.0);
        let mut info_y = PAGE_HEIGHT - 22.0;
        if !company.tax_id.is_empty() {
            self.text(&format!("RUC: {}", company.tax_id), FONT_TABLE, &self.font.clone(), 50.0, info_y);
            info_y -= 5.0;
        }
        if !company.address.is_empty() {
            self.text(
                &format!("Dirección: {}", company.address),
                FONT_TABLE,
                &self.font.clone(),
                50.0,
                info_y,
            );
        }

        let title = format!("Cotización N°: {}", self.job.number);
        self.text_centered(&title, FONT_TITLE, &self.font_bold.clone(), PAGE_HEIGHT - 40.0);
        self.rule(PAGE_HEIGHT - 44.0);

        self.text_centered(
            &format!("Página {}", self.page_no),
            FONT_FOOTER,
            &self.font_italic.clone(),
            FOOTER_Y,
        );

        self.y = PAGE_HEIGHT - 52.0;
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Capa 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.page_no += 1;
        self.draw_page_chrome();
    }

    /// 剩余高度不足时换页；返回是否换了页
    fn ensure_space(&mut self, needed: f32) -> bool {
        if self.y - needed < BOTTOM_LIMIT {
            self.new_page();
            return true;
        }
        false
    }

    fn draw_meta_block(&mut self) {
        let job = self.job;
        let mut lines: Vec<String> = vec![
            format!("Fecha: {}", job.date),
            format!("Cliente: {}", job.client.name),
        ];
        if !job.client.tax_id.is_empty() {
            lines.push(format!("RUC: {}", job.client.tax_id));
        }
        if !job.client.address.is_empty() {
            lines.push(format!("Dirección: {}", job.client.address));
        }
        if !job.client.email.is_empty() {
            lines.push(format!("Email: {}", job.client.email));
        }
        lines.push(format!("Condición: {}", job.payment_terms));
        lines.push(format!("Validez: {}", job.validity));
        if let Some(delivery) = &job.delivery_date {
            lines.push(format!("Entrega: {}", delivery));
        }

        for line in lines {
            self.text(&line, FONT_BODY, &self.font.clone(), MARGIN_LEFT, self.y);
            self.y -= ROW_HEIGHT;
        }
        self.y -= 4.0;
    }

    fn draw_table_header(&mut self) {
        let bold = self.font_bold.clone();
        self.text("Descripción", FONT_TABLE, &bold, X_DESC, self.y);
        self.text_right("Cant.", FONT_TABLE, &bold, X_PRICE - 5.0, self.y);
        self.text_right("Precio", FONT_TABLE, &bold, X_SUBTOTAL - 5.0, self.y);
        self.text_right("Subtotal", FONT_TABLE, &bold, CONTENT_RIGHT, self.y);
        self.y -= 2.5;
        self.rule(self.y);
        self.y -= 5.5;
    }

    fn draw_items_table(&mut self) {
        self.draw_table_header();

        let items: &[LineItem] = &self.job.items;
        for item in items {
            let desc_lines = wrap_text(&item.description, DESC_WRAP_CHARS);
            let row_height = ROW_HEIGHT * desc_lines.len() as f32;

            if self.ensure_space(row_height + 4.0) {
                self.draw_table_header();
            }

            let font = self.font.clone();
            let top = self.y;
            for (i, line) in desc_lines.iter().enumerate() {
                self.text(line, FONT_TABLE, &font, X_DESC, top - ROW_HEIGHT * i as f32);
            }
            self.text_right(
                &format!("{:.2}", item.quantity),
                FONT_TABLE,
                &font,
                X_PRICE - 5.0,
                top,
            );
            self.text_right(
                &format_money(item.unit_price),
                FONT_TABLE,
                &font,
                X_SUBTOTAL - 5.0,
                top,
            );
            self.text_right(&format_money(item.subtotal), FONT_TABLE, &font, CONTENT_RIGHT, top);

            self.y -= row_height;
        }

        self.y -= 2.0;
        self.rule(self.y);
        self.y -= 8.0;
    }

    fn draw_totals(&mut self) {
        self.ensure_space(26.0);
        let totals = &self.job.totals;
        let font = self.font.clone();
        let bold = self.font_bold.clone();

        self.text_right("SUBTOTAL:", FONT_TABLE, &font, X_SUBTOTAL, self.y);
        self.text_right(&self.money(totals.subtotal), FONT_TABLE, &font, CONTENT_RIGHT, self.y);
        self.y -= 7.0;

        self.text_right("IGV:", FONT_TABLE, &font, X_SUBTOTAL, self.y);
        self.text_right(&self.money(totals.tax), FONT_TABLE, &font, CONTENT_RIGHT, self.y);
        self.y -= 8.0;

        self.text_right("TOTAL:", FONT_BODY, &bold, X_SUBTOTAL, self.y);
        self.text_right(&self.money(totals.total), FONT_BODY, &bold, CONTENT_RIGHT, self.y);
        self.y -= 12.0;
    }

    fn draw_terms(&mut self) {
        let terms = self.job.terms.trim();
        if terms.is_empty() {
            return;
        }

        self.ensure_space(14.0);
        self.text(
            "Términos y Condiciones:",
            FONT_BODY,
            &self.font_bold.clone(),
            MARGIN_LEFT,
            self.y,
        );
        self.y -= ROW_HEIGHT;

        let font = self.font.clone();
        for line in wrap_text(terms, TERMS_WRAP_CHARS) {
            self.ensure_space(LINE_HEIGHT_SMALL);
            self.text(&line, FONT_SMALL, &font, MARGIN_LEFT, self.y);
            self.y -= LINE_HEIGHT_SMALL;
        }
        self.y -= 6.0;
    }

    /// 参考图区：有图的行项目在文末按 "编号-R{índice}" 配图展示。
    /// 单张图解码失败只跳过该图，不影响整份文档
    fn draw_references(&mut self) {
        let with_images: Vec<(usize, &LineItem)> = self
            .job
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.image_ref.is_some())
            .collect();

        if with_images.is_empty() {
            return;
        }

        self.ensure_space(20.0);
        self.text(
            "Referencias:",
            FONT_BODY,
            &self.font_bold.clone(),
            MARGIN_LEFT,
            self.y,
        );
        self.y -= 8.0;

        for (index, item) in with_images {
            let Some(file_name) = item.image_ref.as_deref() else {
                continue;
            };
            let path = self.job.references_dir.join(file_name);
            let img = match image_crate::open(&path) {
                Ok(img) => img,
                Err(e) => {
                    warn!("se omite imagen de referencia {}: {}", path.display(), e);
                    continue;
                }
            };

            let (w, h) = img.dimensions();
            if w == 0 || h == 0 {
                continue;
            }
            let natural_w = w as f32 * 25.4 / 300.0;
            let natural_h = h as f32 * 25.4 / 300.0;
            let scale = (REF_IMAGE_MAX_W / natural_w)
                .min(REF_IMAGE_MAX_H / natural_h)
                .min(1.0);
            let img_h = natural_h * scale;

            let code = format!("{}-R{}", self.job.number, index + 1);
            let caption_lines = wrap_text(
                &format!("{}  {}", code, item.description),
                TERMS_WRAP_CHARS,
            );
            let caption_h = LINE_HEIGHT_SMALL * caption_lines.len() as f32;

            // 标题行 + 图不够放时整块移到下一页
            self.ensure_space(caption_h + img_h + 10.0);

            let font = self.font.clone();
            for line in &caption_lines {
                self.text(line, FONT_SMALL, &font, MARGIN_LEFT, self.y);
                self.y -= LINE_HEIGHT_SMALL;
            }
            self.y -= 2.0;

            Image::from_dynamic_image(&img).add_to_layer(
                self.layer.clone(),
                ImageTransform {
                    translate_x: Some(Mm(MARGIN_LEFT)),
                    translate_y: Some(Mm(self.y - img_h)),
                    scale_x: Some(scale),
                    scale_y: Some(scale),
                    ..ImageTransform::default()
                },
            );
            self.y -= img_h + 8.0;
        }
    }
}
