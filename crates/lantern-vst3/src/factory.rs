//! VST3 plugin factory.
//!
//! Exposes one class: the combined component created by
//! [`ComponentFactory::create`].

use std::ffi::c_void;
use std::marker::PhantomData;

use lantern_core::Config;
use vst3::com_scrape_types::MakeHeader;
use vst3::{Class, ComWrapper, Steinberg::*};

use crate::util::{write_cstr, write_utf16};
use crate::wrapper::Vst3Config;

const CLASS_CATEGORY: &str = "Audio Module Class";
const SDK_VERSION: &str = "VST 3.7.9";

/// Plugin factory, generic over the component type it creates.
pub struct Factory<C> {
    config: &'static Config,
    vst3_config: &'static Vst3Config,
    _marker: PhantomData<C>,
}

impl<C> Factory<C> {
    pub const fn new(config: &'static Config, vst3_config: &'static Vst3Config) -> Self {
        Self {
            config,
            vst3_config,
            _marker: PhantomData,
        }
    }
}

/// Component types the factory can instantiate.
pub trait ComponentFactory: Class {
    fn create(config: &'static Config) -> Self;
}

impl<C> Class for Factory<C>
where
    C: ComponentFactory + 'static,
    C::Interfaces: MakeHeader<C, ComWrapper<C>>,
{
    type Interfaces = (IPluginFactory3,);
}

impl<C> IPluginFactoryTrait for Factory<C>
where
    C: ComponentFactory + 'static,
    C::Interfaces: MakeHeader<C, ComWrapper<C>>,
{
    unsafe fn getFactoryInfo(&self, info: *mut PFactoryInfo) -> tresult {
        if info.is_null() {
            return kInvalidArgument;
        }

        // SAFETY: non-null and provided by the host for writing.
        let info = unsafe { &mut *info };
        write_cstr(&mut info.vendor, self.config.vendor);
        write_cstr(&mut info.url, self.config.url);
        write_cstr(&mut info.email, self.config.email);
        info.flags = PFactoryInfo_::FactoryFlags_::kUnicode as int32;

        kResultOk
    }

    unsafe fn countClasses(&self) -> i32 {
        1
    }

    unsafe fn getClassInfo(&self, index: i32, info: *mut PClassInfo) -> tresult {
        if info.is_null() || index != 0 {
            return kInvalidArgument;
        }

        // SAFETY: non-null and provided by the host for writing.
        let info = unsafe { &mut *info };
        info.cid = self.vst3_config.component_uid;
        info.cardinality = PClassInfo_::ClassCardinality_::kManyInstances as int32;
        write_cstr(&mut info.category, CLASS_CATEGORY);
        write_cstr(&mut info.name, self.config.name);
        kResultOk
    }

    unsafe fn createInstance(
        &self,
        cid: FIDString,
        iid: FIDString,
        obj: *mut *mut c_void,
    ) -> tresult {
        if cid.is_null() || iid.is_null() || obj.is_null() {
            return kInvalidArgument;
        }

        // SAFETY: class IDs are 16-byte arrays.
        let requested = unsafe { &*(cid as *const TUID) };
        if *requested != self.vst3_config.component_uid {
            return kInvalidArgument;
        }

        let component = ComWrapper::new(C::create(self.config));
        let Some(unknown) = component.as_com_ref::<FUnknown>() else {
            return kNoInterface;
        };
        let ptr = unknown.as_ptr();
        // SAFETY: `ptr` is a live FUnknown; queryInterface adds the reference
        // handed to the host.
        unsafe { ((*(*ptr).vtbl).queryInterface)(ptr, iid as *const TUID, obj) }
    }
}

impl<C> IPluginFactory2Trait for Factory<C>
where
    C: ComponentFactory + 'static,
    C::Interfaces: MakeHeader<C, ComWrapper<C>>,
{
    unsafe fn getClassInfo2(&self, index: i32, info: *mut PClassInfo2) -> tresult {
        if info.is_null() || index != 0 {
            return kInvalidArgument;
        }

        // SAFETY: non-null and provided by the host for writing.
        let info = unsafe { &mut *info };
        info.cid = self.vst3_config.component_uid;
        info.cardinality = PClassInfo_::ClassCardinality_::kManyInstances as int32;
        write_cstr(&mut info.category, CLASS_CATEGORY);
        write_cstr(&mut info.name, self.config.name);
        info.classFlags = 0;
        write_cstr(&mut info.subCategories, &self.config.vst3_subcategories());
        write_cstr(&mut info.vendor, self.config.vendor);
        write_cstr(&mut info.version, self.config.version);
        write_cstr(&mut info.sdkVersion, SDK_VERSION);
        kResultOk
    }
}

impl<C> IPluginFactory3Trait for Factory<C>
where
    C: ComponentFactory + 'static,
    C::Interfaces: MakeHeader<C, ComWrapper<C>>,
{
    unsafe fn getClassInfoUnicode(&self, index: i32, info: *mut PClassInfoW) -> tresult {
        if info.is_null() || index != 0 {
            return kInvalidArgument;
        }

        // SAFETY: non-null and provided by the host for writing.
        let info = unsafe { &mut *info };
        info.cid = self.vst3_config.component_uid;
        info.cardinality = PClassInfo_::ClassCardinality_::kManyInstances as int32;
        write_cstr(&mut info.category, CLASS_CATEGORY);
        write_utf16(&mut info.name, self.config.name);
        info.classFlags = 0;
        write_cstr(&mut info.subCategories, &self.config.vst3_subcategories());
        write_utf16(&mut info.vendor, self.config.vendor);
        write_utf16(&mut info.version, self.config.version);
        write_utf16(&mut info.sdkVersion, SDK_VERSION);
        kResultOk
    }

    unsafe fn setHostContext(&self, _context: *mut FUnknown) -> tresult {
        kResultOk
    }
}
