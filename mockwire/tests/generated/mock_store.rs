// @generated by mockwire_gen for `Store` in `crate::store`.  Do not edit.

use mockwire;
use std::collections;
use std::time;

#[derive(Debug)]
pub struct MockStore {
    mocks: mockwire::MockMethods,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            mocks: mockwire::MockMethods::of(Self::method_set()),
        }
    }

    pub fn method_set() -> mockwire::MethodSet {
        mockwire::MethodSet::new()
            .method("flush", 0, vec![])
            .method("get", 1, vec![mockwire::Output::fallible::<Item, StoreError>()])
            .method("log", 2, vec![])
            .method("put", 2, vec![mockwire::Output::result::<(), StoreError>()])
            .method("stats", 0, vec![mockwire::Output::value::<usize>(), mockwire::Output::value::<usize>(), mockwire::Output::value::<u64>(), mockwire::Output::value::<f64>(), mockwire::Output::value::<bool>()])
            .method("tags", 1, vec![mockwire::Output::value::<collections::HashMap<String, Vec<String>>>()])
            .method("touch", 1, vec![])
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for MockStore {
    type Target = mockwire::MockMethods;

    fn deref(&self) -> &Self::Target {
        &self.mocks
    }
}

impl std::ops::DerefMut for MockStore {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.mocks
    }
}

// make sure the mock implements the trait
const _: fn() = || {
    fn implements<T: ?Sized + Store>() {}
    implements::<MockStore>();
};

impl Store for MockStore {
    fn flush(&self) {
        self.mocks.called("flush", Vec::new());
    }

    fn get(&self, arg1: &str) -> Result<Item, StoreError> {
        let rets = self.mocks.called("get", mockwire::args![arg1.to_owned()]);
        mockwire::as1::<Result<Item, StoreError>>(&rets)
    }

    fn log(&self, arg1: u8, arg2: impl IntoIterator<Item = mockwire::Arg>) {
        let mut args: Vec<mockwire::Arg> = Vec::new();
        args.extend(mockwire::args![arg1]);
        args.extend(arg2);
        self.mocks.called("log", args);
    }

    fn put(&mut self, arg1: Item, arg2: time::Duration) -> Result<(), StoreError> {
        let rets = self.mocks.called("put", mockwire::args![arg1, arg2]);
        mockwire::as1::<Result<(), StoreError>>(&rets)
    }

    fn stats(&self) -> (usize, usize, u64, f64, bool) {
        let rets = self.mocks.called("stats", Vec::new());
        (mockwire::as_value::<usize>(&rets, 0), mockwire::as_value::<usize>(&rets, 1), mockwire::as_value::<u64>(&rets, 2), mockwire::as_value::<f64>(&rets, 3), mockwire::as_value::<bool>(&rets, 4))
    }

    fn tags(&self, arg1: &[String]) -> collections::HashMap<String, Vec<String>> {
        let rets = self.mocks.called("tags", mockwire::args![arg1.to_owned()]);
        mockwire::as1::<collections::HashMap<String, Vec<String>>>(&rets)
    }

    fn touch(&self, arg1: impl IntoIterator<Item = String>) {
        let mut args: Vec<mockwire::Arg> = Vec::new();
        for v in arg1 {
            args.push(mockwire::Arg::new(v));
        }
        self.mocks.called("touch", args);
    }
}
