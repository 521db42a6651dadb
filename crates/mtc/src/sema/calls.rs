//! Call checking: arity first, then argument types

use super::checker::Checker;
use crate::diagnostics::ErrorCode;
use crate::frontend::ast::{Expr, Keyword};
use crate::types::{FunctionType, Type, compatible};

impl Checker {
    /// Check a call expression and return the type it produces
    pub(super) fn check_call(&mut self, func: &Expr, args: &[Expr], keywords: &[Keyword], call: &Expr) -> Type {
        let constructed = self.class_object(func);
        let callee = self.infer_expr(func);
        let arg_types: Vec<Type> = args.iter().map(|arg| self.infer_expr(arg)).collect();
        let keyword_types: Vec<Type> = keywords.iter().map(|kw| self.infer_expr(&kw.value)).collect();

        let signature = match callee {
            Type::Function(signature) => signature,
            Type::Unknown => return Type::Unknown,
            Type::Class(class) => {
                let dunder_call = self.env.lookup_member(&class.name, "__call__").map(|b| b.ty.clone());
                match dunder_call {
                    Some(Type::Function(method)) => method.bound(),
                    Some(_) => return Type::Unknown,
                    None if self.env.has_dynamic_base(&class.name) => return Type::Unknown,
                    None => {
                        self.not_callable(&Type::Class(class), call);
                        return Type::Unknown;
                    }
                }
            }
            other => {
                self.not_callable(&other, call);
                return Type::Unknown;
            }
        };

        // an unseen base class may define the constructor
        if let Some(class) = &constructed {
            if self.env.has_dynamic_base(class) && self.env.lookup_member(class, "__init__").is_none() {
                return *signature.ret;
            }
        }

        if self.check_arity(&signature, args.len(), keywords, call) {
            self.check_argument_types(&signature, args, &arg_types, keywords, &keyword_types);
        }
        *signature.ret
    }

    fn not_callable(&mut self, ty: &Type, call: &Expr) {
        self.error(
            call.line,
            call.span,
            format!("\"{}\" not callable", ty),
            Some(ErrorCode::Operator),
        );
    }

    /// Report the first arity problem; returns true if the arguments fit
    fn check_arity(&mut self, signature: &FunctionType, positional: usize, keywords: &[Keyword], call: &Expr) -> bool {
        let target = signature.describe();
        let with_target = |message: &str| match &target {
            Some(target) => format!("{} for {}", message, target),
            None => message.to_string(),
        };

        if positional > signature.params.len() {
            self.error(call.line, call.span, with_target("Too many arguments"), None);
            return false;
        }

        let mut filled: Vec<bool> = (0..signature.params.len()).map(|i| i < positional).collect();
        for keyword in keywords {
            match signature.params.iter().position(|p| p.name == keyword.name) {
                None => {
                    let message = with_target(&format!("Unexpected keyword argument \"{}\"", keyword.name));
                    self.error(call.line, call.span, message, None);
                    return false;
                }
                Some(i) if filled[i] => {
                    let message = format!(
                        "{} gets multiple values for keyword argument \"{}\"",
                        target.as_deref().unwrap_or("function"),
                        keyword.name
                    );
                    self.error(call.line, call.span, message, None);
                    return false;
                }
                Some(i) => filled[i] = true,
            }
        }

        let missing: Vec<String> = signature
            .params
            .iter()
            .zip(&filled)
            .filter(|(param, filled)| !**filled && !param.has_default)
            .map(|(param, _)| format!("\"{}\"", param.name))
            .collect();

        if missing.is_empty() {
            return true;
        }

        let message = match &target {
            Some(target) if missing.len() == 1 => {
                format!("Missing positional argument {} in call to {}", missing[0], target)
            }
            Some(target) => {
                format!("Missing positional arguments {} in call to {}", missing.join(", "), target)
            }
            None => "Too few arguments".to_string(),
        };
        self.error(call.line, call.span, message, None);
        false
    }

    fn check_argument_types(
        &mut self,
        signature: &FunctionType,
        args: &[Expr],
        arg_types: &[Type],
        keywords: &[Keyword],
        keyword_types: &[Type],
    ) {
        let target = signature
            .describe()
            .map(|t| format!(" to {}", t))
            .unwrap_or_default();

        for (index, ((arg, ty), param)) in args.iter().zip(arg_types).zip(&signature.params).enumerate() {
            if !compatible(ty, &param.ty) {
                self.error(
                    arg.line,
                    arg.span,
                    format!(
                        "Argument {}{} has incompatible type \"{}\"; expected \"{}\"",
                        index + 1,
                        target,
                        ty,
                        param.ty
                    ),
                    Some(ErrorCode::ArgType),
                );
            }
        }

        for (keyword, ty) in keywords.iter().zip(keyword_types) {
            let Some(param) = signature.params.iter().find(|p| p.name == keyword.name) else {
                continue;
            };
            if !compatible(ty, &param.ty) {
                self.error(
                    keyword.value.line,
                    keyword.value.span,
                    format!(
                        "Argument \"{}\"{} has incompatible type \"{}\"; expected \"{}\"",
                        keyword.name, target, ty, param.ty
                    ),
                    Some(ErrorCode::ArgType),
                );
            }
        }
    }
}
