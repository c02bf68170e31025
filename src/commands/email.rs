use crate::commands::resolve_document_path;
use crate::config::{AppState, EmailConfig};
use crate::error::Result;
use crate::quotation::QuoteStatus;
use lettre::message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tauri::State;
use tracing::warn;

/// 测试 SMTP 连接
#[tauri::command]
pub async fn test_smtp_connection(state: State<'_, AppState>) -> Result<String> {
    let email = {
        let config = state
            .config
            .lock()
            .map_err(|_| "configuración no disponible".to_string())?;
        config.email.clone()
    };
    validate_email_config(&email)?;

    let transport = build_smtp_transport(&email)?;
    transport
        .test_connection()
        .await
        .map_err(|e| format!("Falló la conexión SMTP: {}", e))?;

    Ok(format!("Conexión exitosa con {}:{}", email.host, email.port))
}

/// 发送报价单：正文纯文本 + PDF 附件，单次尝试，失败原样上报。
/// 发送成功后把记录标记为 Enviada
#[tauri::command]
pub async fn send_quotation_email(
    state: State<'_, AppState>,
    number: String,
    to: Option<String>,
) -> Result<String> {
    let record = state
        .history
        .load_all()
        .into_iter()
        .find(|r| r.number == number)
        .ok_or_else(|| format!("Cotización no encontrada: {}", number))?;

    let recipient = to
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| record.client.email.clone());
    if recipient.is_empty() {
        return Err("No se envió correo (sin destinatario).".to_string());
    }

    let (email_config, company_name) = {
        let config = state
            .config
            .lock()
            .map_err(|_| "configuración no disponible".to_string())?;
        (config.email.clone(), config.company.name.clone())
    };
    validate_email_config(&email_config)?;

    let pdf_path = resolve_document_path(&state, &record)?;
    let pdf_bytes =
        std::fs::read(&pdf_path).map_err(|e| format!("No se pudo adjuntar el PDF: {}", e))?;

    let from_mailbox: Mailbox = email_config
        .username
        .parse()
        .map_err(|e| format!("Remitente inválido: {}", e))?;
    let to_mailbox: Mailbox = recipient
        .trim()
        .parse()
        .map_err(|e| format!("Destinatario '{}' inválido: {}", recipient, e))?;

    let body = format!(
        "Estimado(a) {},\n\nAdjuntamos la cotización {}.\n\nSaludos cordiales,\n{}",
        record.client.name, number, company_name
    );

    let attachment = Attachment::new(format!("Cotizacion_{}.pdf", number))
        .body(pdf_bytes, ContentType::parse("application/pdf").unwrap());

    let message = Message::builder()
        .from(from_mailbox)
        .to(to_mailbox)
        .subject(format!("Cotización {}", number))
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body))
                .singlepart(attachment),
        )
        .map_err(|e| format!("No se pudo construir el correo: {}", e))?;

    let transport = build_smtp_transport(&email_config)?;
    transport
        .send(message)
        .await
        .map_err(|e| format!("No se pudo enviar el correo: {}", e))?;

    // 标记失败不影响已完成的发送，只记录
    if let Err(e) = state.history.update_status(&number, QuoteStatus::Sent) {
        warn!("no se pudo marcar {} como enviada: {}", number, e);
    }

    Ok(format!("Cotización enviada a {}", recipient))
}

fn validate_email_config(email: &EmailConfig) -> Result<()> {
    if email.host.trim().is_empty()
        || email.username.trim().is_empty()
        || email.password.trim().is_empty()
    {
        return Err(
            "Configura servidor, usuario y password en 'Configuración' antes de enviar."
                .to_string(),
        );
    }
    Ok(())
}

/// 构建 SMTP 传输：STARTTLS 或无加密
fn build_smtp_transport(email: &EmailConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
    let creds = Credentials::new(email.username.clone(), email.password.clone());

    if email.use_tls {
        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&email.host)
                .map_err(|e| format!("SMTP STARTTLS relay erróneo: {}", e))?
                .port(email.port)
                .credentials(creds)
                .build(),
        )
    } else {
        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&email.host)
                .port(email.port)
                .credentials(creds)
                .build(),
        )
    }
}
