//! Runtime support emitted at the top of every chunk.
//!
//! Every helper is a `__`-prefixed local, and the globals the helpers need
//! are captured before any program definition is declared, so user names may
//! freely shadow Lua globals such as `type` or `string`. Definitions live in
//! the `__graphs`, `__types` and `__variants` tables.
//!
//! Lists are recognized through `__is_array`, which the runtime installs to
//! see past the protected array metatable. Without it the prelude compares
//! metatables directly.

pub(crate) const PRELUDE: &str = r##"local __array_mt = __array_mt or {}
local __setmt, __getmt, __type, __pairs, __ipairs, __select = setmetatable, getmetatable, type, pairs, ipairs, select
local __tostring, __tonumber, __pcall, __assert, __error = tostring, tonumber, pcall, assert, error
local __floor, __abs, __sort, __tconcat = math.floor, math.abs, table.sort, table.concat
local __find, __sub, __gsub, __match, __strfmt = string.find, string.sub, string.gsub, string.match, string.format
local __lower, __upper = string.lower, string.upper
local __write, __read = io.write, io.read
local __is_array = __is_array or function(v)
  return __getmt(v) == __array_mt
end
local __graphs, __types, __variants = {}, {}, {}

local function __list(t)
  return __setmt(t, __array_mt)
end

local function __is_list(v)
  return __type(v) == "table" and __is_array(v)
end

local function __raise(msg)
  __error(msg, 0)
end

local function __record(name)
  return { __name = name }
end

local function __enum(name)
  return { __name = name }
end

local function __variant(base, tag, arity)
  return __setmt({ __tag = tag, __base = base }, {
    __call = function(_, ...)
      local v = { __tag = tag }
      if arity == 1 then
        v.value = (...)
      else
        for i = 1, arity do
          v["_" .. (i - 1)] = __select(i, ...)
        end
      end
      return __setmt(v, base)
    end,
  })
end

local function __is(v, tag)
  return __type(v) == "table" and v.__tag == tag
end

local function __eq(a, b)
  if a == b then
    return true
  end
  if __type(a) ~= "table" or __type(b) ~= "table" then
    return false
  end
  for k, v in __pairs(a) do
    if not __eq(v, b[k]) then
      return false
    end
  end
  for k in __pairs(b) do
    if a[k] == nil then
      return false
    end
  end
  return true
end

local function __sorted_keys(t)
  local keys = {}
  for k in __pairs(t) do
    keys[#keys + 1] = k
  end
  __sort(keys, function(a, b)
    return __tostring(a) < __tostring(b)
  end)
  return keys
end

local __tostr
__tostr = function(v)
  local t = __type(v)
  if v == nil then
    return "none"
  elseif t == "string" then
    return v
  elseif t == "number" then
    if v == __floor(v) and v > -1e15 and v < 1e15 then
      return __strfmt("%d", v)
    end
    return __tostring(v)
  elseif t ~= "table" then
    return __tostring(v)
  end
  local parts = {}
  if __is_list(v) then
    for i = 1, #v do
      parts[i] = __tostr(v[i])
    end
    return "[" .. __tconcat(parts, ", ") .. "]"
  end
  if v.__tag ~= nil then
    if v.value ~= nil then
      return v.__tag .. "(" .. __tostr(v.value) .. ")"
    end
    local i = 0
    while v["_" .. i] ~= nil do
      parts[#parts + 1] = __tostr(v["_" .. i])
      i = i + 1
    end
    if #parts == 0 then
      return v.__tag
    end
    return v.__tag .. "(" .. __tconcat(parts, ", ") .. ")"
  end
  for _, k in __ipairs(__sorted_keys(v)) do
    parts[#parts + 1] = __tostr(k) .. ": " .. __tostr(v[k])
  end
  return "{" .. __tconcat(parts, ", ") .. "}"
end

local function __float_str(v)
  if v == __floor(v) and v > -1e15 and v < 1e15 then
    return __strfmt("%.1f", v)
  end
  return __tostr(v)
end

local function __strings(sep, ...)
  local parts = {}
  for i = 1, __select("#", ...) do
    parts[i] = __tostr((__select(i, ...)))
  end
  return __tconcat(parts, sep)
end

local function __len(v)
  if __type(v) == "table" and not __is_list(v) then
    local n = 0
    for _ in __pairs(v) do
      n = n + 1
    end
    return n
  end
  return #v
end

local function __idiv(a, b)
  if b == 0 then
    __raise("division by zero")
  end
  return __floor(a / b)
end

local function __mod(a, b)
  if b == 0 then
    __raise("modulo by zero")
  end
  return a % b
end

local function __min(a, b)
  if b == nil then
    local m = a[1]
    for i = 2, #a do
      if a[i] < m then
        m = a[i]
      end
    end
    return m
  end
  if b < a then
    return b
  end
  return a
end

local function __max(a, b)
  if b == nil then
    local m = a[1]
    for i = 2, #a do
      if a[i] > m then
        m = a[i]
      end
    end
    return m
  end
  if b > a then
    return b
  end
  return a
end

local function __range(a, b, step)
  if b == nil then
    a, b = 0, a
  end
  step = step or 1
  if step == 0 then
    __raise("range: step must not be zero")
  end
  local out, i = {}, a
  if step > 0 then
    while i < b do
      out[#out + 1] = i
      i = i + step
    end
  else
    while i > b do
      out[#out + 1] = i
      i = i + step
    end
  end
  return __list(out)
end

local function __to_int(v)
  if v == true then
    return 1
  elseif v == false then
    return 0
  end
  local n = __tonumber(v)
  if n == nil then
    __raise("to-int: not a number: " .. __tostr(v))
  end
  if n < 0 then
    return -__floor(-n)
  end
  return __floor(n)
end

local function __to_float(v)
  local n = __tonumber(v)
  if n == nil then
    __raise("to-float: not a number: " .. __tostr(v))
  end
  return n
end

local function __map(fn, xs)
  local out = {}
  for i = 1, #xs do
    out[i] = fn(xs[i])
  end
  return __list(out)
end

local function __filter(fn, xs)
  local out = {}
  for i = 1, #xs do
    if fn(xs[i]) then
      out[#out + 1] = xs[i]
    end
  end
  return __list(out)
end

local function __reduce(fn, init, xs)
  local acc = init
  for i = 1, #xs do
    acc = fn(acc, xs[i])
  end
  return acc
end

local function __reduce_either(fn, init, xs)
  if __type(xs) ~= "table" and __type(init) == "table" then
    init, xs = xs, init
  end
  return __reduce(fn, init, xs)
end

local function __fold(fn, xs)
  if #xs == 0 then
    __raise("reduce of empty list with no initial value")
  end
  local acc = xs[1]
  for i = 2, #xs do
    acc = fn(acc, xs[i])
  end
  return acc
end

local function __flat_map(fn, xs)
  local out = {}
  for i = 1, #xs do
    local ys = fn(xs[i])
    for j = 1, #ys do
      out[#out + 1] = ys[j]
    end
  end
  return __list(out)
end

local function __sort_by(fn, xs)
  local keyed = {}
  for i = 1, #xs do
    keyed[i] = { k = fn(xs[i]), i = i, v = xs[i] }
  end
  __sort(keyed, function(a, b)
    if a.k == b.k then
      return a.i < b.i
    end
    return a.k < b.k
  end)
  local out = {}
  for i = 1, #keyed do
    out[i] = keyed[i].v
  end
  return __list(out)
end

local function __any(fn, xs)
  for i = 1, #xs do
    local hit
    if fn == nil then
      hit = xs[i]
    else
      hit = fn(xs[i])
    end
    if hit then
      return true
    end
  end
  return false
end

local function __all(fn, xs)
  for i = 1, #xs do
    local hit
    if fn == nil then
      hit = xs[i]
    else
      hit = fn(xs[i])
    end
    if not hit then
      return false
    end
  end
  return true
end

local function __clamp(i, n)
  if i < 0 then
    i = i + n
  end
  if i < 0 then
    return 0
  elseif i > n then
    return n
  end
  return i
end

local function __slice(xs, a, b)
  local n = #xs
  a = __clamp(a or 0, n)
  b = __clamp(b or n, n)
  if __type(xs) == "string" then
    return __sub(xs, a + 1, b)
  end
  local out = {}
  for i = a + 1, b do
    out[#out + 1] = xs[i]
  end
  return __list(out)
end

local function __take(n, xs)
  if __type(n) == "table" then
    n, xs = xs, n
  end
  return __slice(xs, 0, n)
end

local function __drop(n, xs)
  if __type(n) == "table" then
    n, xs = xs, n
  end
  return __slice(xs, n)
end

local function __nth(xs, i)
  if i < 0 then
    i = i + #xs
  end
  return xs[i + 1]
end

local function __tail(xs)
  return __slice(xs, 1)
end

local function __cons(x, xs)
  local out = { x }
  for i = 1, #xs do
    out[i + 1] = xs[i]
  end
  return __list(out)
end

local function __append(xs, x)
  local out = {}
  for i = 1, #xs do
    out[i] = xs[i]
  end
  out[#xs + 1] = x
  return __list(out)
end

local function __reverse(xs)
  local out, n = {}, #xs
  for i = 1, n do
    out[i] = xs[n - i + 1]
  end
  return __list(out)
end

local function __contains(coll, x)
  if __type(coll) == "string" then
    return __find(coll, x, 1, true) ~= nil
  end
  if not __is_list(coll) then
    return coll[x] ~= nil
  end
  for i = 1, #coll do
    if __eq(coll[i], x) then
      return true
    end
  end
  return false
end

local function __index_of(coll, x)
  if __type(coll) == "string" then
    local i = __find(coll, x, 1, true)
    if i == nil then
      return -1
    end
    return i - 1
  end
  for i = 1, #coll do
    if __eq(coll[i], x) then
      return i - 1
    end
  end
  return -1
end

local function __sum(xs)
  local s = 0
  for i = 1, #xs do
    s = s + xs[i]
  end
  return s
end

local function __product(xs)
  local p = 1
  for i = 1, #xs do
    p = p * xs[i]
  end
  return p
end

local function __zip(a, b)
  local out = {}
  local n = #a
  if #b < n then
    n = #b
  end
  for i = 1, n do
    out[i] = __list({ a[i], b[i] })
  end
  return __list(out)
end

local function __enumerate(xs)
  local out = {}
  for i = 1, #xs do
    out[i] = __list({ i - 1, xs[i] })
  end
  return __list(out)
end

local function __concat(...)
  local first = (...)
  if __is_list(first) then
    local out = {}
    for i = 1, __select("#", ...) do
      local xs = (__select(i, ...))
      for j = 1, #xs do
        out[#out + 1] = xs[j]
      end
    end
    return __list(out)
  end
  return __strings("", ...)
end

local function __format(fmt, ...)
  local args = { n = __select("#", ...), ... }
  local next_arg = 0
  return (__gsub(fmt, "{(%d*)}", function(index)
    local i
    if index == "" then
      i = next_arg
      next_arg = next_arg + 1
    else
      i = __tonumber(index)
    end
    return __tostr(args[i + 1])
  end))
end

local function __split(s, sep)
  local out = {}
  if sep == "" then
    for i = 1, #s do
      out[i] = __sub(s, i, i)
    end
    return __list(out)
  end
  local start = 1
  while true do
    local i, j = __find(s, sep, start, true)
    if i == nil then
      break
    end
    out[#out + 1] = __sub(s, start, i - 1)
    start = j + 1
  end
  out[#out + 1] = __sub(s, start)
  return __list(out)
end

local function __join(sep, xs)
  if __type(sep) == "table" then
    sep, xs = xs, sep
  end
  local parts = {}
  for i = 1, #xs do
    parts[i] = __tostr(xs[i])
  end
  return __tconcat(parts, sep)
end

local function __trim(s)
  return (__match(s, "^%s*(.-)%s*$"))
end

local function __replace(s, old, new)
  if old == "" then
    return s
  end
  local out, start = {}, 1
  while true do
    local i, j = __find(s, old, start, true)
    if i == nil then
      break
    end
    out[#out + 1] = __sub(s, start, i - 1)
    out[#out + 1] = new
    start = j + 1
  end
  out[#out + 1] = __sub(s, start)
  return __tconcat(out)
end

local function __starts_with(s, prefix)
  return __sub(s, 1, #prefix) == prefix
end

local function __ends_with(s, suffix)
  return suffix == "" or __sub(s, -#suffix) == suffix
end

local function __keys(d)
  return __list(__sorted_keys(d))
end

local function __values(d)
  local out = {}
  for i, k in __ipairs(__sorted_keys(d)) do
    out[i] = d[k]
  end
  return __list(out)
end

local function __get_or(d, k, default)
  local v = d[k]
  if v == nil then
    return default
  end
  return v
end

local function __set(rec, field, value)
  local out = {}
  for k, v in __pairs(rec) do
    out[k] = v
  end
  out[field] = value
  return __setmt(out, __getmt(rec))
end

local function __unwrap(v)
  if v == nil then
    __raise("unwrap: value is none")
  end
  return v
end

local function __map_opt(fn, v)
  if v == nil then
    return nil
  end
  return fn(v)
end

local function __or_else(v, default)
  if v == nil then
    return default
  end
  return v
end

local function __print(...)
  __write(__strings(" ", ...), "\n")
end

local function __read_line()
  return __read("*l") or ""
end

local function __errmsg(e)
  if __type(e) == "string" then
    return e
  end
  return __tostr(e)
end
"##;
