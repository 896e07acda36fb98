/// 编辑对话框：关闭，或带着一份编辑缓冲打开
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormDialog<F> {
    pub show: bool,
    pub data: F,
}

impl<F> FormDialog<F> {
    pub fn open(&mut self, data: F) {
        self.data = data;
        self.show = true;
    }

    pub fn close(&mut self) {
        self.show = false;
    }

    /// 打开时返回缓冲
    pub fn current(&self) -> Option<&F> {
        self.show.then_some(&self.data)
    }
}
