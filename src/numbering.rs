use crate::config::AppConfig;
use crate::quotation::QuotationRecord;

/// 去掉 -V{n} 后缀，返回（基础编号, 版本号）。无后缀视为版本 1
pub fn split_version(number: &str) -> (String, u32) {
    if let Some(idx) = number.rfind("-V") {
        let suffix = &number[idx + 2..];
        if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(version) = suffix.parse::<u32>() {
                if version >= 1 {
                    return (number[..idx].to_string(), version);
                }
            }
        }
    }
    (number.to_string(), 1)
}

pub fn base_number(series: &str, correlative: u32) -> String {
    format!("{}-{:05}", series, correlative)
}

/// 计算某基础编号的下一个版本编号。版本号从历史数据重新计算，
/// 不做持久化预留：中途放弃的版本号会被重新使用而不是泄漏
pub fn next_version(history: &[QuotationRecord], base: &str) -> String {
    let next = history
        .iter()
        .filter(|r| r.base_number == base)
        .map(|r| r.version.max(1))
        .max()
        .map(|max| max + 1)
        .unwrap_or(2);
    format!("{}-V{}", base, next)
}

/// 发号。基础序列路径递增 correlative，调用方必须立刻持久化配置：
/// 编号一经显示即视为已消耗，宁可跳号也不能在异常退出后重复
pub fn issue(
    config: &mut AppConfig,
    history: &[QuotationRecord],
    version_of: Option<&str>,
) -> String {
    match version_of {
        Some(existing) => {
            let (base, _) = split_version(existing);
            next_version(history, &base)
        }
        None => {
            let number = base_number(&config.series, config.correlative);
            config.correlative += 1;
            number
        }
    }
}
