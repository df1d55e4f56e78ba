use crate::context::Context;
use crate::response::Reply;
use crate::Error;

pub trait Executable {
    fn exec(self, ctx: &Context) -> Result<Reply, Error>;
}
