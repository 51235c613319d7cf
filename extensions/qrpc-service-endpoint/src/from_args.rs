use crate::error::RpcMethodError;
use qrpc::rpc::{FromValue, Value};

/// Typed view of a request's positional argument list.
///
/// Implemented for tuples of up to four [`FromValue`] types; the argument
/// count must match exactly.
pub trait FromArgs: Sized {
    fn from_args(args: Vec<Value>) -> Result<Self, RpcMethodError>;
}

impl FromArgs for () {
    fn from_args(args: Vec<Value>) -> Result<Self, RpcMethodError> {
        if args.is_empty() {
            Ok(())
        } else {
            Err(RpcMethodError::Arity {
                expected: 0,
                actual: args.len(),
            })
        }
    }
}

impl FromArgs for Vec<Value> {
    fn from_args(args: Vec<Value>) -> Result<Self, RpcMethodError> {
        Ok(args)
    }
}

macro_rules! impl_from_args {
    ($len:literal => $($ty:ident : $idx:tt),+) => {
        impl<$($ty: FromValue),+> FromArgs for ($($ty,)+) {
            fn from_args(args: Vec<Value>) -> Result<Self, RpcMethodError> {
                if args.len() != $len {
                    return Err(RpcMethodError::Arity {
                        expected: $len,
                        actual: args.len(),
                    });
                }

                let mut args = args.into_iter();
                Ok(($(
                    {
                        let value = args.next().unwrap_or_default();
                        $ty::from_value(value).map_err(|source| RpcMethodError::Argument {
                            index: $idx,
                            source,
                        })?
                    },
                )+))
            }
        }
    };
}

impl_from_args!(1 => A: 0);
impl_from_args!(2 => A: 0, B: 1);
impl_from_args!(3 => A: 0, B: 1, C: 2);
impl_from_args!(4 => A: 0, B: 1, C: 2, D: 3);
