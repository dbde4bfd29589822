//! 配置校验模块
//!
//! 校验规则：
//! - retry_delay_ms > 0
//! - max_empty_batches (若设置) > 0
//! - processor.name 非空
//! - max_batch_size > 0
//! - file 类型必须提供 params.path

use contracts::{ContractError, DispatchBlueprint, ProcessorKind};

/// 校验 DispatchBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &DispatchBlueprint) -> Result<(), ContractError> {
    validate_dispatcher(blueprint)?;
    validate_processor_limits(blueprint)?;
    validate_processor_params(blueprint)?;
    Ok(())
}

/// 校验分发器设置
fn validate_dispatcher(blueprint: &DispatchBlueprint) -> Result<(), ContractError> {
    let settings = &blueprint.dispatcher;

    if settings.retry_delay_ms == 0 {
        return Err(ContractError::config_validation(
            "dispatcher.retry_delay_ms",
            "retry_delay_ms must be > 0",
        ));
    }

    if settings.max_empty_batches == Some(0) {
        return Err(ContractError::config_validation(
            "dispatcher.max_empty_batches",
            "max_empty_batches must be > 0 when set",
        ));
    }

    Ok(())
}

/// 校验处理器限流参数
fn validate_processor_limits(blueprint: &DispatchBlueprint) -> Result<(), ContractError> {
    let processor = &blueprint.processor;

    if processor.name.is_empty() {
        return Err(ContractError::config_validation(
            "processor.name",
            "processor name cannot be empty",
        ));
    }

    if processor.max_batch_size == 0 {
        return Err(ContractError::config_validation(
            format!("processor[{}].max_batch_size", processor.name),
            "max_batch_size must be > 0",
        ));
    }

    Ok(())
}

/// 校验类型特定参数
fn validate_processor_params(blueprint: &DispatchBlueprint) -> Result<(), ContractError> {
    let processor = &blueprint.processor;

    match processor.kind {
        ProcessorKind::Log => Ok(()),
        ProcessorKind::File => match processor.params.get("path") {
            Some(path) if !path.is_empty() => Ok(()),
            _ => Err(ContractError::config_validation(
                format!("processor[{}].params.path", processor.name),
                "file processor requires a non-empty path",
            )),
        },
    }
}
